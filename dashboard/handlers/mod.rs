pub mod home;
pub mod report;
pub mod scan;
pub mod scan_sse;
