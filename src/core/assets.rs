//! Embedded guidance corpus.
//!
//! Every corpus document is baked into the binary at compile time so the
//! engine deploys hermetically, with no external files required at runtime.

/// Macro to embed guidance documents at compile time as text.
///
/// Generates:
/// - Public constants for each embedded document
/// - `get_embedded_doc(path)` function for lookup
/// - `list_docs()` function for discovery
macro_rules! embedded_docs {
    ($($path:expr => $const_name:ident),* $(,)?) => {
        $(
            pub const $const_name: &str =
                include_str!(concat!("../../guidance/", $path));
        )*

        pub fn get_embedded_doc(path: &str) -> Option<&'static str> {
            match path {
                $( $path => Some($const_name), )*
                _ => None,
            }
        }

        pub fn list_docs() -> Vec<&'static str> {
            vec![ $( $path, )* ]
        }
    };
}

embedded_docs! {
    // Supreme tier: safety categories and their override principles
    "OVERRIDES.md" => EMBEDDED_OVERRIDES,
    // Always-applicable guidance
    "BASE.md" => EMBEDDED_BASE,
    // Optional implementation notes
    "PROCEDURES.md" => EMBEDDED_PROCEDURES,
    // Topic scopes
    "topics/CODING.md" => EMBEDDED_TOPIC_CODING,
    "topics/MULTI_AGENT.md" => EMBEDDED_TOPIC_MULTI_AGENT,
    "topics/COMMUNICATION.md" => EMBEDDED_TOPIC_COMMUNICATION,
}
