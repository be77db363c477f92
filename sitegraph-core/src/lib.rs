pub mod audit;
pub mod layering;
pub mod report;

pub use audit::{AuditOptions, AuditProgressCallback, execute_audit};
pub use layering::{LayerAssignment, LayerMap, PageRole, assign_layers, find_orphans};
pub use report::{Report, ReportFormat, assemble_report, generate_json_report, generate_text_report, save_report};
