//! Built-in placeholder sticker, always available.

use crate::image::{ImageRef, InlineImage};

pub fn placeholder_image(label: &str) -> ImageRef {
    let label = if label.trim().is_empty() { "Friend" } else { label.trim() };
    let svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1024\" height=\"1024\">\
<rect width=\"100%\" height=\"100%\" fill=\"#fff\"/>\
<circle cx=\"512\" cy=\"384\" r=\"320\" fill=\"#f3f4f6\"/>\
<text x=\"512\" y=\"620\" font-size=\"72\" font-family=\"Arial, Helvetica, sans-serif\" \
fill=\"#111827\" text-anchor=\"middle\">{}</text></svg>",
        escape_xml(label)
    );
    ImageRef::Inline(InlineImage::new("image/svg+xml", svg.into_bytes()))
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
