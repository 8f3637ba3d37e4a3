//! Invocation options shared by every pipeline stage.

use std::path::PathBuf;

/// Runtime the generated bindings target.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Uses the global `fetch` and `WebSocket`.
    #[default]
    Browser,
    /// Imports `node-fetch` and `ws`.
    Node,
}

impl Environment {
    /// `node` when the flag is set, `browser` otherwise.
    pub fn from_node_flag(node: bool) -> Self {
        if node { Self::Node } else { Self::Browser }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Node => "node",
        }
    }
}

/// Import style of the generated modules.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum ModuleStyle {
    #[default]
    CommonJs,
    EsModule,
}

impl ModuleStyle {
    pub fn from_es_module_flag(es_module: bool) -> Self {
        if es_module {
            Self::EsModule
        } else {
            Self::CommonJs
        }
    }
}

/// Subscription transport used by the generated runtime.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionTransport {
    /// The `graphql-ws` client protocol.
    GraphqlWs,
    /// Raw websocket with the legacy `start` message.
    #[default]
    Legacy,
}

impl SubscriptionTransport {
    /// `graphql-ws` selects the client protocol; any other value is legacy.
    pub fn from_flag(value: Option<&str>) -> Self {
        match value {
            Some("graphql-ws") => Self::GraphqlWs,
            _ => Self::Legacy,
        }
    }
}

/// HTTP verb used to query a remote schema endpoint.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

impl HttpMethod {
    /// Only the literal `GET` selects GET. Every other value, including
    /// `DELETE` or a lowercase `get`, is sent as POST.
    pub fn normalize(value: Option<&str>) -> Self {
        match value {
            Some("GET") => Self::Get,
            _ => Self::Post,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// The full set of user-facing options for one invocation.
#[derive(Clone, Debug, Default)]
pub struct InvocationOptions {
    /// First positional argument: URL or path of the schema, if given.
    pub source: Option<String>,
    /// Second positional argument: directory receiving the `zeus/` bindings.
    pub output_dir: PathBuf,
    /// Raw `Name: Value` header strings forwarded to the fetcher.
    pub headers: Vec<String>,
    pub method: HttpMethod,
    pub environment: Environment,
    pub module_style: ModuleStyle,
    pub const_enums: bool,
    pub subscriptions: SubscriptionTransport,
    /// Destination of the schema mirror, directory or `.graphql`/`.gql` file.
    pub graphql: Option<PathBuf>,
    /// Destination of the JSON Schema document, directory or `.json` file.
    pub json_schema: Option<PathBuf>,
    pub typed_document_node: bool,
    /// Persist a source given on the command line or at the prompt.
    pub save_on_input: bool,
}

impl InvocationOptions {
    /// Whether generated imports carry an explicit `.js` suffix.
    pub fn uses_js_extensions(&self) -> bool {
        self.module_style == ModuleStyle::EsModule || self.environment == Environment::Node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_normalization() {
        assert_eq!(HttpMethod::normalize(Some("GET")), HttpMethod::Get);
        assert_eq!(HttpMethod::normalize(Some("POST")), HttpMethod::Post);
        assert_eq!(HttpMethod::normalize(Some("DELETE")), HttpMethod::Post);
        assert_eq!(HttpMethod::normalize(Some("get")), HttpMethod::Post);
        assert_eq!(HttpMethod::normalize(None), HttpMethod::Post);
    }

    #[test]
    fn test_subscription_flag() {
        assert_eq!(
            SubscriptionTransport::from_flag(Some("graphql-ws")),
            SubscriptionTransport::GraphqlWs
        );
        assert_eq!(
            SubscriptionTransport::from_flag(Some("socket.io")),
            SubscriptionTransport::Legacy
        );
        assert_eq!(SubscriptionTransport::from_flag(None), SubscriptionTransport::Legacy);
    }

    #[test]
    fn test_environment_from_flag() {
        assert_eq!(Environment::from_node_flag(true).as_str(), "node");
        assert_eq!(Environment::from_node_flag(false).as_str(), "browser");
    }

    #[test]
    fn test_js_extensions() {
        let mut options = InvocationOptions::default();
        assert!(!options.uses_js_extensions());
        options.environment = Environment::Node;
        assert!(options.uses_js_extensions());
        options.environment = Environment::Browser;
        options.module_style = ModuleStyle::EsModule;
        assert!(options.uses_js_extensions());
    }
}
