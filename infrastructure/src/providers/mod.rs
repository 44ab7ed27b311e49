//! Completion provider adapters
//!
//! Each adapter speaks one HTTP wire protocol and classifies every failure
//! into a `CallError`; retries, breakers and fallback live in the
//! application layer.

mod anthropic;
mod catalog;
pub mod http_error;
mod openai_compatible;

pub use anthropic::AnthropicProvider;
pub use catalog::{build_providers, build_providers_with};
pub use openai_compatible::OpenAiCompatibleProvider;

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;

    /// Serve `router` on an ephemeral local port and return its base URL
    pub async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
