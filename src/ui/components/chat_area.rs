use eframe::egui;
use eframe::egui::text::LayoutJob;
use eframe::egui::{Color32, FontId, Stroke, TextFormat};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::common::HistoryEntry;
use crate::render::markdown_options;
use crate::ui::state::AppState;

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let scroll_to_latest = state.take_scroll_request();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            for entry in &state.history {
                render_entry(ui, entry);
            }
            if scroll_to_latest {
                ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
            }
        });
}

fn render_entry(ui: &mut egui::Ui, entry: &HistoryEntry) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(&entry.sender)
                    .strong()
                    .color(sender_color(&entry.sender, ui.visuals())),
            );
            ui.label(egui::RichText::new(&entry.timestamp).weak().small());
        });

        let body_size = ui
            .style()
            .text_styles
            .get(&egui::TextStyle::Body)
            .map(|font| font.size)
            .unwrap_or(14.0);
        let mut job = markdown_layout(&entry.source, ui.visuals(), body_size);
        job.wrap.max_width = ui.available_width();
        ui.label(job);
    });
    ui.add_space(4.0);
}

fn sender_color(sender: &str, visuals: &egui::Visuals) -> Color32 {
    match sender {
        "user" | "patient" => visuals.hyperlink_color,
        _ => visuals.strong_text_color(),
    }
}

/// Dàn markdown thành rich text của egui (nhấn mạnh, in đậm, code, link,
/// tiêu đề, danh sách). HTML thô hiển thị nguyên dạng chữ.
pub fn markdown_layout(source: &str, visuals: &egui::Visuals, body_size: f32) -> LayoutJob {
    let mut builder = LayoutBuilder::new(visuals, body_size);
    for event in Parser::new_ext(source, markdown_options()) {
        builder.apply(event);
    }
    builder.job
}

struct LayoutBuilder {
    job: LayoutJob,
    body_size: f32,
    text_color: Color32,
    strong_color: Color32,
    link_color: Color32,
    code_bg: Color32,
    emphasis: usize,
    strong: usize,
    strikethrough: usize,
    link: usize,
    heading: bool,
    code_block: bool,
    /// Số thứ tự kế tiếp của từng danh sách đang mở; `None` nếu là gạch đầu dòng.
    lists: Vec<Option<u64>>,
    pending_newlines: usize,
}

impl LayoutBuilder {
    fn new(visuals: &egui::Visuals, body_size: f32) -> Self {
        Self {
            job: LayoutJob::default(),
            body_size,
            text_color: visuals.text_color(),
            strong_color: visuals.strong_text_color(),
            link_color: visuals.hyperlink_color,
            code_bg: visuals.code_bg_color,
            emphasis: 0,
            strong: 0,
            strikethrough: 0,
            link: 0,
            heading: false,
            code_block: false,
            lists: Vec::new(),
            pending_newlines: 0,
        }
    }

    fn apply(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Emphasis) => self.emphasis += 1,
            Event::End(TagEnd::Emphasis) => self.emphasis = self.emphasis.saturating_sub(1),
            Event::Start(Tag::Strong) => self.strong += 1,
            Event::End(TagEnd::Strong) => self.strong = self.strong.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => self.strikethrough += 1,
            Event::End(TagEnd::Strikethrough) => {
                self.strikethrough = self.strikethrough.saturating_sub(1)
            }
            Event::Start(Tag::Link { .. }) => self.link += 1,
            Event::End(TagEnd::Link) => self.link = self.link.saturating_sub(1),
            Event::Start(Tag::Heading { .. }) => {
                self.break_line(1);
                self.heading = true;
            }
            Event::End(TagEnd::Heading(_)) => {
                self.heading = false;
                self.break_line(1);
            }
            Event::Start(Tag::CodeBlock(_)) => {
                self.break_line(1);
                self.code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.code_block = false;
                self.break_line(1);
            }
            Event::Start(Tag::List(first)) => {
                self.break_line(1);
                self.lists.push(first);
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
                self.break_line(1);
            }
            Event::Start(Tag::Item) => {
                self.break_line(1);
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                let indent = "  ".repeat(depth);
                self.push(&format!("{indent}{marker}"), self.format());
            }
            Event::End(TagEnd::Item) => self.break_line(1),
            Event::End(TagEnd::Paragraph) => {
                let gap = if self.lists.is_empty() { 2 } else { 1 };
                self.break_line(gap);
            }
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                let trimmed = text.trim_end_matches('\n');
                if !trimmed.is_empty() {
                    self.push(trimmed, self.format());
                }
                if trimmed.len() < text.len() {
                    self.break_line(1);
                }
            }
            Event::Code(code) => {
                let mut format = self.format();
                format.font_id = FontId::monospace(self.body_size);
                format.background = self.code_bg;
                self.push(&code, format);
            }
            Event::SoftBreak => self.push(" ", self.format()),
            Event::HardBreak => self.break_line(1),
            Event::Rule => {
                self.break_line(1);
                self.push("———", self.format());
                self.break_line(1);
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push(marker, self.format());
            }
            _ => {}
        }
    }

    fn format(&self) -> TextFormat {
        let size = if self.heading {
            self.body_size * 1.3
        } else {
            self.body_size
        };
        let font_id = if self.code_block {
            FontId::monospace(size)
        } else {
            FontId::proportional(size)
        };
        let color = if self.link > 0 {
            self.link_color
        } else if self.strong > 0 || self.heading {
            self.strong_color
        } else {
            self.text_color
        };

        TextFormat {
            font_id,
            color,
            italics: self.emphasis > 0,
            underline: if self.link > 0 {
                Stroke::new(1.0, self.link_color)
            } else {
                Stroke::NONE
            },
            strikethrough: if self.strikethrough > 0 {
                Stroke::new(1.0, color)
            } else {
                Stroke::NONE
            },
            background: if self.code_block {
                self.code_bg
            } else {
                Color32::TRANSPARENT
            },
            ..Default::default()
        }
    }

    /// Xuống dòng được hoãn lại để layout không mở đầu hay kết thúc bằng dòng trống.
    fn break_line(&mut self, count: usize) {
        self.pending_newlines = self.pending_newlines.max(count);
    }

    fn push(&mut self, text: &str, format: TextFormat) {
        if self.pending_newlines > 0 && !self.job.text.is_empty() {
            let newlines = "\n".repeat(self.pending_newlines);
            self.job.append(&newlines, 0.0, self.format());
        }
        self.pending_newlines = 0;
        self.job.append(text, 0.0, format);
    }
}
