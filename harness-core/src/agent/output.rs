//! Output streaming and parsing for Claude Code JSON stream format

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::{Error, Result};

/// A message from the Claude Code stream-json output
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    /// System message at the start
    System {
        #[serde(default)]
        subtype: Option<String>,
        #[serde(default)]
        session_id: Option<String>,
    },

    /// Assistant output (text and tool calls)
    Assistant {
        #[serde(default)]
        message: MessageBody,
    },

    /// Tool results fed back to the assistant
    User {
        #[serde(default)]
        message: MessageBody,
    },

    /// Final result of the run
    Result {
        #[serde(default)]
        subtype: Option<String>,
        #[serde(default)]
        is_error: bool,
        #[serde(default)]
        num_turns: Option<u32>,
        #[serde(default)]
        duration_ms: Option<u64>,
        #[serde(default)]
        total_cost_usd: Option<f64>,
    },

    /// Any message type this harness does not know about
    #[serde(other)]
    Unknown,
}

/// Body of an assistant or user message
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MessageBody {
    #[serde(default)]
    pub content: MessageContent,
}

/// Message content: either plain text or a list of blocks
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Blocks(Vec::new())
    }
}

/// A single content block
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    ToolResult {
        #[serde(default)]
        is_error: bool,
    },
    #[serde(other)]
    Other,
}

/// One unit of agent output as seen by the harness
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseUnit {
    /// Textual content meant for the operator
    Text(String),
    /// Anything else, with a short generic rendering
    Other { kind: String, summary: String },
}

impl MessageContent {
    /// Concatenated text of all text blocks, if any
    fn text(&self) -> Option<String> {
        match self {
            MessageContent::Text(s) => Some(s.clone()),
            MessageContent::Blocks(blocks) => {
                let parts: Vec<&str> = blocks
                    .iter()
                    .filter_map(|b| match b {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("\n"))
                }
            }
        }
    }

    fn describe_blocks(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .map(|b| match b {
                    ContentBlock::Text { .. } => "text".to_string(),
                    ContentBlock::ToolUse { name, input } => format!("tool_use {} {}", name, input),
                    ContentBlock::ToolResult { is_error: true } => "tool_result (error)".to_string(),
                    ContentBlock::ToolResult { is_error: false } => "tool_result".to_string(),
                    ContentBlock::Other => "other".to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl StreamMessage {
    /// Convert a parsed message into the unit the harness reports
    pub fn into_unit(self) -> ResponseUnit {
        match self {
            StreamMessage::Assistant { message } => match message.content.text() {
                Some(text) => ResponseUnit::Text(text),
                None => ResponseUnit::Other {
                    kind: "assistant".to_string(),
                    summary: message.content.describe_blocks(),
                },
            },
            StreamMessage::User { message } => ResponseUnit::Other {
                kind: "user".to_string(),
                summary: message.content.describe_blocks(),
            },
            StreamMessage::System {
                subtype,
                session_id,
            } => ResponseUnit::Other {
                kind: "system".to_string(),
                summary: format!(
                    "{} (session: {})",
                    subtype.as_deref().unwrap_or("unknown"),
                    session_id.as_deref().unwrap_or("none")
                ),
            },
            StreamMessage::Result {
                subtype,
                is_error,
                num_turns,
                duration_ms,
                total_cost_usd,
            } => {
                let mut summary = subtype.unwrap_or_else(|| "done".to_string());
                if is_error {
                    summary.push_str(" (error)");
                }
                if let Some(turns) = num_turns {
                    summary.push_str(&format!(", {} turns", turns));
                }
                if let Some(ms) = duration_ms {
                    summary.push_str(&format!(", {}ms", ms));
                }
                if let Some(cost) = total_cost_usd {
                    summary.push_str(&format!(", ${:.4}", cost));
                }
                ResponseUnit::Other {
                    kind: "result".to_string(),
                    summary,
                }
            }
            StreamMessage::Unknown => ResponseUnit::Other {
                kind: "unknown".to_string(),
                summary: String::new(),
            },
        }
    }
}

/// Parse one stream-json line into a response unit
///
/// Lines that are not valid stream messages are kept as raw `Other` units.
pub fn parse_line(line: &str) -> ResponseUnit {
    match serde_json::from_str::<StreamMessage>(line) {
        Ok(StreamMessage::Unknown) => {
            let kind = serde_json::from_str::<serde_json::Value>(line)
                .ok()
                .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
                .unwrap_or_else(|| "unknown".to_string());
            ResponseUnit::Other {
                kind,
                summary: line.to_string(),
            }
        }
        Ok(msg) => msg.into_unit(),
        Err(e) => {
            tracing::debug!(error = %e, "Unparsable stream line");
            ResponseUnit::Other {
                kind: "raw".to_string(),
                summary: line.to_string(),
            }
        }
    }
}

/// Line-oriented reader over an agent's stdout
pub struct OutputStreamer<R> {
    reader: BufReader<R>,
    line: String,
}

impl<R: AsyncRead + Unpin> OutputStreamer<R> {
    /// Create a new output streamer from a child process stdout
    pub fn new(stdout: R) -> Self {
        Self {
            reader: BufReader::new(stdout),
            line: String::new(),
        }
    }

    /// Read the next non-empty line as a response unit
    ///
    /// Returns `None` when the stream ends (process closes stdout)
    pub async fn next_unit(&mut self) -> Result<Option<ResponseUnit>> {
        loop {
            self.line.clear();
            let bytes_read = self
                .reader
                .read_line(&mut self.line)
                .await
                .map_err(Error::Io)?;

            if bytes_read == 0 {
                // EOF
                return Ok(None);
            }

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Ok(Some(parse_line(trimmed)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assistant_text_blocks() {
        let json = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"Hello"},{"type":"text","text":"world"}]}}"#;
        assert_eq!(parse_line(json), ResponseUnit::Text("Hello\nworld".to_string()));
    }

    #[test]
    fn test_parse_assistant_plain_string() {
        let json = r#"{"type":"assistant","message":{"content":"Hello world"}}"#;
        assert_eq!(parse_line(json), ResponseUnit::Text("Hello world".to_string()));
    }

    #[test]
    fn test_parse_tool_use_only_is_other() {
        let json = r#"{"type":"assistant","message":{"content":[{"type":"tool_use","id":"t1","name":"Read","input":{"file_path":"/plan.md"}}]}}"#;
        match parse_line(json) {
            ResponseUnit::Other { kind, summary } => {
                assert_eq!(kind, "assistant");
                assert!(summary.starts_with("tool_use Read"));
                assert!(summary.contains("/plan.md"));
            }
            other => panic!("Expected Other unit, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_user_tool_result() {
        let json = r#"{"type":"user","message":{"content":[{"type":"tool_result","tool_use_id":"t1","content":"ok","is_error":true}]}}"#;
        assert_eq!(
            parse_line(json),
            ResponseUnit::Other {
                kind: "user".to_string(),
                summary: "tool_result (error)".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_result() {
        let json = r#"{"type":"result","subtype":"success","is_error":false,"num_turns":4,"duration_ms":1234,"total_cost_usd":0.5}"#;
        assert_eq!(
            parse_line(json),
            ResponseUnit::Other {
                kind: "result".to_string(),
                summary: "success, 4 turns, 1234ms, $0.5000".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_system() {
        let json = r#"{"type":"system","subtype":"init","session_id":"abc123"}"#;
        assert_eq!(
            parse_line(json),
            ResponseUnit::Other {
                kind: "system".to_string(),
                summary: "init (session: abc123)".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_type_keeps_kind() {
        let json = r#"{"type":"stream_event","event":{}}"#;
        match parse_line(json) {
            ResponseUnit::Other { kind, .. } => assert_eq!(kind, "stream_event"),
            other => panic!("Expected Other unit, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_line_is_raw() {
        assert_eq!(
            parse_line("not json at all"),
            ResponseUnit::Other {
                kind: "raw".to_string(),
                summary: "not json at all".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_streamer_skips_blank_lines_and_ends() {
        let input: &[u8] = b"{\"type\":\"assistant\",\"message\":{\"content\":\"hi\"}}\n\n   \n{\"type\":\"result\"}\n";
        let mut streamer = OutputStreamer::new(input);

        assert_eq!(
            streamer.next_unit().await.unwrap(),
            Some(ResponseUnit::Text("hi".to_string()))
        );
        assert!(matches!(
            streamer.next_unit().await.unwrap(),
            Some(ResponseUnit::Other { ref kind, .. }) if kind == "result"
        ));
        assert_eq!(streamer.next_unit().await.unwrap(), None);
    }
}
