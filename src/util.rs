use crate::error::ScrapeError;
use rand::Rng;
use scraper::{ElementRef, Node, Selector};
use std::time::Duration;

/// Parse a selector known at compile time. Only use with literals.
pub fn sel(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

/// Parse a selector built at runtime, e.g. from configured anchor ids
pub fn try_sel(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.into(),
        reason: e.to_string(),
    })
}

/// Text of the first match of `sel` below `e`, with each text node trimmed and joined
pub fn get_text(e: &ElementRef, sel: &Selector) -> Option<String> {
    e.select(sel).next().map(|v| stripped_text(&v))
}

/// All text nodes of the element, each trimmed, concatenated without separator
pub fn stripped_text(e: &ElementRef) -> String {
    e.text().map(str::trim).filter(|t| !t.is_empty()).collect()
}

pub fn reduce_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Uppercase the first letter of every alphabetic run and lowercase the rest,
/// so "made-to-order grill" becomes "Made-To-Order Grill".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

const BLOCK_ELEMENTS: &[&str] = &["p", "div", "li", "tr", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Text as a browser would lay it out: whitespace inside text runs is collapsed,
/// while `<br>` and block elements start new lines.
pub fn rendered_text(e: &ElementRef) -> String {
    let mut out = String::new();
    render_into(e, &mut out);
    out.lines()
        .map(str::trim)
        .collect::<Vec<&str>>()
        .join("\n")
        .trim()
        .to_string()
}

fn render_into(e: &ElementRef, out: &mut String) {
    for child in e.children() {
        match child.value() {
            Node::Text(t) => {
                let collapsed = reduce_whitespace(t);
                if collapsed.is_empty() {
                    if !t.is_empty() && !out.is_empty() && !out.ends_with([' ', '\n']) {
                        out.push(' ');
                    }
                    continue;
                }
                if t.starts_with(char::is_whitespace) && !out.is_empty() && !out.ends_with([' ', '\n']) {
                    out.push(' ');
                }
                out.push_str(&collapsed);
                if t.ends_with(char::is_whitespace) {
                    out.push(' ');
                }
            }
            Node::Element(el) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = el.name();
                if name == "br" {
                    out.push('\n');
                } else if BLOCK_ELEMENTS.contains(&name) {
                    out.push('\n');
                    render_into(&child, out);
                    out.push('\n');
                } else {
                    render_into(&child, out);
                }
            }
            _ => (),
        }
    }
}

/// Sleep for a random amount of time within the given range, to not hammer the remote end
pub async fn wait_random_range_ms(min: u64, max: u64) {
    if max == 0 {
        return;
    }
    let ms = rand::rng().random_range(min..=max.max(min));
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn title_case_words() {
        assert_eq!("Made To Order Grill", title_case("made to order grill"));
        assert_eq!("Soup Of The Day", title_case("SOUP of tHE day"));
        assert_eq!("Pizza 2Go", title_case("pizza 2go"));
    }

    #[test]
    fn stripped_text_joins_trimmed_nodes() {
        let html = Html::parse_fragment("<h2>  Fresh <span> Salads </span>\n</h2>");
        let h2 = html.select(&sel("h2")).next().unwrap();
        assert_eq!("FreshSalads", stripped_text(&h2));
    }

    #[test]
    fn rendered_text_breaks_on_br() {
        let html = Html::parse_fragment(
            "<table><tr><td>\n  Salpicon<br>\n  Bittie   Bitez<br><br>\n</td></tr></table>",
        );
        let td = html.select(&sel("td")).next().unwrap();
        assert_eq!("Salpicon\nBittie Bitez", rendered_text(&td));
    }

    #[test]
    fn rendered_text_breaks_on_paragraphs() {
        let html =
            Html::parse_fragment("<table><tr><td><p>Tacos</p><p>Dogs <b>Haus</b></p></td></tr></table>");
        let td = html.select(&sel("td")).next().unwrap();
        assert_eq!("Tacos\n\nDogs Haus", rendered_text(&td));
    }

    #[test]
    fn rendered_text_empty_cell() {
        let html = Html::parse_fragment("<table><tr><td>  \n </td></tr></table>");
        let td = html.select(&sel("td")).next().unwrap();
        assert_eq!("", rendered_text(&td));
    }
}
