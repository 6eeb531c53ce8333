/// Lệnh từ ChatClient gửi xuống socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketCommand {
    /// Ghi một text frame đã serialize sẵn.
    SendFrame(String),
    /// Đóng kết nối một cách có trật tự (code 1000).
    Close,
}
