use crate::common::HistoryEntry;

/// Trạng thái cục bộ của UI: ô nhập liệu và khung lịch sử chat.
#[derive(Debug, Default)]
pub struct AppState {
    pub history: Vec<HistoryEntry>,
    pub input_text: String,
    /// Bật sau mỗi lần thêm mục; khung lịch sử cuộn xuống cuối rồi tắt cờ.
    pub scroll_to_latest: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_entry(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
        self.scroll_to_latest = true;
    }

    /// Trả về cờ cuộn tới mục mới nhất và xoá cờ.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_latest)
    }
}
