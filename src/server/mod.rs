//! MCP tool surface. Stateless: every tool call resolves its project from
//! the request, touches durable state under the project's record directory,
//! and returns one JSON payload. Failures become an `{"error": ...}` payload,
//! never a protocol-level fault.

pub mod schemas;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde_json::json;
use std::path::Path;

use crate::analyze::FileAnalyzer;
use crate::inject::inject_rules;
use crate::ledger::ProgressLedger;
use crate::scan::scan_project;
use crate::server::schemas::{
    AnalyzeFileRequest, InjectRulesRequest, ProgressStatisticsRequest, RecordCompletionRequest,
    ResetProgressRequest, ScanProjectRequest,
};

#[derive(Clone)]
pub struct ReforgeService {
    tool_router: ToolRouter<Self>,
}

impl ReforgeService {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for ReforgeService {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a payload-or-error into the single JSON text content every tool
/// returns.
fn envelope(result: crate::error::Result<serde_json::Value>) -> CallToolResult {
    let payload = match result {
        Ok(value) => value,
        Err(e) => json!({ "error": e.to_string() }),
    };
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string());
    CallToolResult::success(vec![Content::text(text)])
}

/// Next-step guidance staged by completion percentage.
fn recommendations(percentage: f64) -> Vec<&'static str> {
    if percentage < 25.0 {
        vec![
            "start with low-complexity files to build momentum",
            "use inject_rules output for per-file strategy",
        ]
    } else if percentage < 50.0 {
        vec![
            "move on to medium-complexity files",
            "keep additions consistent with each file's style",
        ]
    } else if percentage < 75.0 {
        vec![
            "tackle high-complexity files through extensions",
            "re-check earlier files still compile",
        ]
    } else {
        vec![
            "close out the remaining files",
            "verify every addition is exercised by existing code",
        ]
    }
}

#[tool_router]
impl ReforgeService {
    /// Inventory a project tree and (re-)initialize its progress ledger.
    #[tool(
        description = "Scan a project tree: classify every matching source file by size, complexity, and sensitivity, persist an immutable scan snapshot, and initialize the transformation progress ledger."
    )]
    pub async fn scan_project(
        &self,
        Parameters(request): Parameters<ScanProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = (|| {
            let root = Path::new(&request.project_path);
            let (snapshot, record_info) = scan_project(
                root,
                request.include_tests.unwrap_or(false),
                request.preserve_completed,
            )?;
            let mut payload = serde_json::to_value(&snapshot)?;
            if let Some(info) = record_info {
                payload["record_info"] = serde_json::to_value(&info)?;
            }
            Ok(payload)
        })();
        Ok(envelope(result))
    }

    /// Classify a single file's content. Pure; touches no durable state.
    #[tool(
        description = "Analyze one file's content: line count, declaration counts, size bucket, complexity bucket, framework markers, and sensitive-content flag."
    )]
    pub async fn analyze_file(
        &self,
        Parameters(request): Parameters<AnalyzeFileRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = (|| {
            let analyzer = FileAnalyzer::default();
            let record = analyzer.analyze(&request.file_path, &request.file_content);
            Ok(serde_json::to_value(&record)?)
        })();
        Ok(envelope(result))
    }

    /// Mark files complete in the project's ledger.
    #[tool(
        description = "Record transformed files in the progress ledger. Unknown paths are reported back as invalid_files and never tracked; re-recording a completed file is a no-op."
    )]
    pub async fn record_completion(
        &self,
        Parameters(request): Parameters<RecordCompletionRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = (|| {
            let root = Path::new(&request.project_path);
            let mut ledger = ProgressLedger::load(root)?;
            let notes = request.notes.as_deref().unwrap_or("");
            let outcome = ledger.record_completion(&request.completed_files, notes)?;
            let mut payload = serde_json::to_value(&outcome)?;
            payload["next_steps"] =
                serde_json::to_value(recommendations(outcome.completion_percentage))?;
            Ok(payload)
        })();
        Ok(envelope(result))
    }

    /// Read-only progress statistics.
    #[tool(
        description = "Get transformation progress for a project: totals, completion percentage, remaining files preview, and last update time."
    )]
    pub async fn progress_statistics(
        &self,
        Parameters(request): Parameters<ProgressStatisticsRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = (|| {
            let root = Path::new(&request.project_path);
            let ledger = ProgressLedger::load(root)?;
            Ok(serde_json::to_value(ledger.statistics())?)
        })();
        Ok(envelope(result))
    }

    /// Clear completion state, keeping the tracked file list.
    #[tool(
        description = "Reset a project's transformation progress: clears completions and update history, keeps the tracked file list and totals."
    )]
    pub async fn reset_progress(
        &self,
        Parameters(request): Parameters<ResetProgressRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = (|| {
            let root = Path::new(&request.project_path);
            let mut ledger = ProgressLedger::load(root)?;
            ledger.reset()?;
            Ok(json!({
                "success": true,
                "total_files": ledger.total_files(),
            }))
        })();
        Ok(envelope(result))
    }

    /// Install rule templates into the editor workspace.
    #[tool(
        description = "Inject transformation rule documents into <editor_root>/.cursor/rules: two static templates plus one generated from the latest scan's statistics and an optional app theme."
    )]
    pub async fn inject_rules(
        &self,
        Parameters(request): Parameters<InjectRulesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let result = (|| {
            let outcome = inject_rules(
                Path::new(&request.project_path),
                Path::new(&request.editor_root),
                request.app_theme.as_deref(),
            )?;
            Ok(serde_json::to_value(&outcome)?)
        })();
        Ok(envelope(result))
    }
}

#[tool_handler]
impl ServerHandler for ReforgeService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Project inventory and transformation progress tracking. Typical flow: \
                 scan_project to inventory and initialize the ledger, inject_rules to \
                 install guidance into the editor workspace, record_completion after \
                 transforming files, progress_statistics to see where things stand."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_of(result: &CallToolResult) -> serde_json::Value {
        let text = result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.as_str())
            .expect("tool returned text content");
        serde_json::from_str(text).expect("payload is JSON")
    }

    #[test]
    fn test_envelope_wraps_errors() {
        let result = envelope(Err(crate::error::ReforgeError::LedgerNotFound {
            project: "/p".into(),
        }));
        let value = payload_of(&result);
        assert!(value["error"].as_str().unwrap().contains("run a scan first"));
    }

    #[test]
    fn test_envelope_passes_payload_through() {
        let result = envelope(Ok(json!({ "total_files": 3 })));
        let value = payload_of(&result);
        assert_eq!(value["total_files"], 3);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_recommendations_cover_all_stages() {
        for pct in [0.0, 30.0, 60.0, 90.0, 100.0] {
            assert!(!recommendations(pct).is_empty());
        }
    }
}
