/// Mã đóng báo cáo khi kết nối rớt mà không có close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;
/// Mã đóng báo cáo khi peer gửi close frame không kèm status.
pub const NO_STATUS_RECEIVED: u16 = 1005;

/// Sự kiện từ socket gửi lên ChatClient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Opened,
    Frame(String),
    Error(String),
    Closed { code: u16, reason: String },
}
