use eframe::egui;

const SEND_BUTTON_WIDTH: f32 = 60.0;

/// Ô nhập tin nhắn + nút Send. Trả về `true` khi form được submit
/// (bấm Send hoặc Enter); việc trim và gửi do ChatClient xử lý.
pub fn render(ui: &mut egui::Ui, input_text: &mut String) -> bool {
    let mut submitted = false;
    ui.horizontal(|ui| {
        let width = (ui.available_width() - SEND_BUTTON_WIDTH).max(0.0);
        let response = ui.add(
            egui::TextEdit::singleline(input_text)
                .hint_text("Type a message")
                .desired_width(width),
        );
        if ui.button("Send").clicked() {
            submitted = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submitted = true;
            response.request_focus();
        }
    });

    submitted
}
