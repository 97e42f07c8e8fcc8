mod approval_writer;

pub use approval_writer::ApprovalWriter;
