//! Chuyển markdown sang HTML cho các mục lịch sử chat.
//!
//! Tin nhắn đến từ server (hoặc do người dùng gửi rồi được echo lại) nên đầu ra
//! được làm sạch: HTML thô bị escape thành chữ, link hoặc ảnh có scheme chạy
//! được script bị thay bằng `#`.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};

const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Chuyển markdown sang HTML đã làm sạch. Hàm thuần, đồng bộ.
pub fn markdown_to_html(source: &str) -> String {
    let events = Parser::new_ext(source, markdown_options()).map(sanitize_event);
    let mut output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut output, events);
    output
}

fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutralize_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralize_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn neutralize_url(url: CowStr<'_>) -> CowStr<'_> {
    let lowered = url.trim_start().to_ascii_lowercase();
    if BLOCKED_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        CowStr::Borrowed("#")
    } else {
        url
    }
}
