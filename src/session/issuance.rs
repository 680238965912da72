//! Session issuance channel.
//!
//! The host shell asks for a token on behalf of a renderer context, passing
//! the context's origin as a hint. The origin must be on the allow-list
//! before a session is created or reused.
//!
//! Over stdio the protocol is one JSON object per line:
//!
//! ```text
//! → {"origin": "https://localhost:5173"}
//! ← {"token": "q2N0...="}
//! → {}
//! ← {"token": "..."}                      (origin defaults to file://)
//! → {"origin": "https://evil.example"}
//! ← {"error": "Unauthorized origin: https://evil.example"}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

use crate::security::origin::{normalize_origin, OriginMatcher, FILE_ORIGIN};
use crate::session::store::SessionStore;
use crate::session::token::SessionToken;

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("Unauthorized origin: {0}")]
    UnauthorizedOrigin(String),
}

/// Hands out origin-bound tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    matcher: Arc<OriginMatcher>,
    sessions: Arc<SessionStore>,
}

impl SessionIssuer {
    pub fn new(matcher: Arc<OriginMatcher>, sessions: Arc<SessionStore>) -> Self {
        Self { matcher, sessions }
    }

    /// Issue (or reuse) the token for the hinted origin, `file://` when absent.
    pub fn issue(&self, origin_hint: Option<&str>) -> Result<SessionToken, IssueError> {
        let origin = origin_hint
            .and_then(normalize_origin)
            .unwrap_or_else(|| FILE_ORIGIN.to_string());

        if !self.matcher.validate(&origin) {
            return Err(IssueError::UnauthorizedOrigin(origin));
        }

        Ok(self.sessions.get_or_create(&origin))
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokenRequest {
    #[serde(default)]
    origin: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum TokenReply {
    Token { token: String },
    Error { error: String },
}

impl SessionIssuer {
    fn answer(&self, line: &str) -> TokenReply {
        let request: TokenRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                return TokenReply::Error {
                    error: format!("Invalid token request: {e}"),
                }
            }
        };

        match self.issue(request.origin.as_deref()) {
            Ok(token) => TokenReply::Token {
                token: token.into_string(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Token request refused");
                TokenReply::Error {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Answer newline-delimited token requests until EOF or shutdown.
    pub async fn serve_lines<R, W>(
        &self,
        reader: R,
        mut writer: W,
        mut shutdown: broadcast::Receiver<()>,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = shutdown.recv() => {
                    tracing::info!("Issuance channel received shutdown signal");
                    break;
                }
            };

            let Some(line) = line else {
                tracing::info!("Issuance channel closed by host");
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let reply = self.answer(&line);
            let mut encoded = serde_json::to_vec(&reply).map_err(std::io::Error::other)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> SessionIssuer {
        SessionIssuer::new(
            Arc::new(OriginMatcher::new(Vec::new())),
            Arc::new(SessionStore::new()),
        )
    }

    #[test]
    fn test_issue_for_allowed_origin() {
        let issuer = issuer();
        let first = issuer.issue(Some("https://localhost:5173")).unwrap();
        let second = issuer.issue(Some("https://localhost:5173/index.html")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_hint_defaults_to_file_origin() {
        let issuer = issuer();
        let token = issuer.issue(None).unwrap();
        assert!(issuer.sessions.validate(token.as_str(), FILE_ORIGIN));

        let blank = issuer.issue(Some("  ")).unwrap();
        assert_eq!(token, blank);
    }

    #[test]
    fn test_refuses_disallowed_origin() {
        let issuer = issuer();
        let err = issuer.issue(Some("https://evil.example")).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized origin: https://evil.example");
        assert!(issuer.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_serve_lines_protocol() {
        let issuer = issuer();
        let input = b"{\"origin\":\"https://localhost:5173\"}\n\n{\"origin\":\"https://evil.example\"}\nnot json\n";
        let mut output = Vec::new();
        let (_tx, rx) = broadcast::channel(1);

        issuer.serve_lines(&input[..], &mut output, rx).await.unwrap();

        let replies: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(replies.len(), 3);

        let token = replies[0]["token"].as_str().unwrap();
        assert!(issuer.sessions.validate(token, "https://localhost:5173"));
        assert_eq!(replies[1]["error"], "Unauthorized origin: https://evil.example");
        assert!(replies[2]["error"].as_str().unwrap().starts_with("Invalid token request"));
    }
}
