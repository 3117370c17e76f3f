//! PlantUML renderer backed by an HTTP diagram service.
//!
//! Posts the diagram description to a PlantUML-compatible server and receives
//! PNG bytes back. No external style configuration: server defaults apply.

use std::time::Duration;

use ureq::Agent;

use crate::kind::DiagramKind;
use crate::png::png_dimensions;
use crate::render::{DiagramRenderer, RenderError, RenderErrorCause};

/// Default HTTP timeout for one render request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`DiagramRenderer`] for [`DiagramKind::PlantUml`] talking to a server.
pub struct PlantUmlServerRenderer {
    server_url: String,
    agent: Agent,
}

impl PlantUmlServerRenderer {
    /// Create a renderer for the given server URL with the default timeout.
    #[must_use]
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_timeout(server_url, DEFAULT_TIMEOUT)
    }

    /// Create a renderer with an explicit request timeout.
    #[must_use]
    pub fn with_timeout(server_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            server_url: server_url.into(),
            agent,
        }
    }

    fn png_url(&self) -> String {
        format!("{}/png", self.server_url.trim_end_matches('/'))
    }

    fn error(cause: RenderErrorCause) -> RenderError {
        RenderError::new(DiagramKind::PlantUml, cause)
    }
}

impl DiagramRenderer for PlantUmlServerRenderer {
    fn kind(&self) -> DiagramKind {
        DiagramKind::PlantUml
    }

    fn render(&self, source: &str) -> Result<Vec<u8>, RenderError> {
        let url = self.png_url();
        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "text/plain")
            .send(source.as_bytes())
            .map_err(|e| Self::error(RenderErrorCause::Http(e.to_string())))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let detail = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            // PlantUML servers answer 400 for malformed diagram text.
            let cause = if status == 400 {
                RenderErrorCause::Syntax(detail)
            } else {
                RenderErrorCause::Http(format!("HTTP {status}: {detail}"))
            };
            return Err(Self::error(cause));
        }

        let bytes = body
            .read_to_vec()
            .map_err(|e| Self::error(RenderErrorCause::Io(e.to_string())))?;
        if png_dimensions(&bytes).is_none() {
            return Err(Self::error(RenderErrorCause::Http(
                "server returned invalid PNG data".to_owned(),
            )));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_url_trims_trailing_slash() {
        let renderer = PlantUmlServerRenderer::new("http://localhost:8080/");
        assert_eq!(renderer.png_url(), "http://localhost:8080/png");

        let renderer = PlantUmlServerRenderer::new("http://localhost:8080");
        assert_eq!(renderer.png_url(), "http://localhost:8080/png");
    }

    #[test]
    fn test_reports_plantuml_kind() {
        let renderer = PlantUmlServerRenderer::new("http://localhost:8080");
        assert_eq!(renderer.kind(), DiagramKind::PlantUml);
    }
}
