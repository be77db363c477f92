// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    audit_options_from_args,
    exit_code,
    render_report,
    resolve_output_path,
};

// Re-export audit functionality from sitegraph-core
pub use sitegraph_core::audit::{AuditOptions, AuditProgressCallback, execute_audit};
pub use sitegraph_core::report::{Report, ReportFormat};
