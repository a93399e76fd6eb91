//! Embedded static resources.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `preview` - Preview client script (observer socket + click selection)
//!
//! # Usage
//!
//! ```ignore
//! use embed::preview::{CLIENT_JS, ClientVars};
//!
//! let js = CLIENT_JS.render(&ClientVars { ws_port: 24680 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod preview {
    use super::{Template, TemplateVars};

    /// Route the preview server answers with the client script.
    pub const CLIENT_JS_URL: &str = "/__vina/client.js";

    /// Variables for the preview client.
    pub struct ClientVars {
        pub ws_port: u16,
    }

    impl TemplateVars for ClientVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__VINA_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Preview client, minified at build time.
    pub const CLIENT_JS: Template<ClientVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/preview-client.min.js")));

    /// `<script>` tag injected into served HTML.
    pub fn script_tag() -> String {
        format!(r#"<script src="{CLIENT_JS_URL}" defer></script>"#)
    }

}
