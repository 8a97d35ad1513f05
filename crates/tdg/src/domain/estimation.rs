//! Complexity markers embedded in card titles.
//!
//! Boards using the "Scrum for Trello" convention prefix card titles with
//! `(n)` for the estimated complexity and `[n]` for the real one, e.g.
//! `(3) [5] Migrate schema`. Either marker may be absent and they may appear
//! in either order. Only leading markers count.
//!
//! A marker holds a story-point sized number: up to three integer digits,
//! up to two decimals, and no more than [`MAX_POINTS`]. Anything else, such
//! as the year in `(2020) Retro`, stays part of the title.

/// Largest value accepted inside a marker.
pub const MAX_POINTS: f64 = 100.0;

/// Values recovered from a card title.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimations {
    /// Value of the leading `(n)` marker.
    pub estimated: Option<f64>,
    /// Value of the leading `[n]` marker.
    pub real: Option<f64>,
    /// Title with the recognized markers removed.
    pub title: String,
}

/// Split leading complexity markers off a card title.
pub fn parse_estimations(name: &str) -> Estimations {
    let mut estimated = None;
    let mut real = None;
    let mut rest = name.trim_start();

    loop {
        if estimated.is_none()
            && let Some((value, tail)) = leading_marker(rest, '(', ')')
        {
            estimated = Some(value);
            rest = tail.trim_start();
            continue;
        }
        if real.is_none()
            && let Some((value, tail)) = leading_marker(rest, '[', ']')
        {
            real = Some(value);
            rest = tail.trim_start();
            continue;
        }
        break;
    }

    Estimations {
        estimated,
        real,
        title: rest.trim_end().to_string(),
    }
}

fn leading_marker(text: &str, open: char, close: char) -> Option<(f64, &str)> {
    let inner = text.strip_prefix(open)?;
    let end = inner.find(close)?;
    let value = parse_points(inner[..end].trim())?;
    Some((value, &inner[end + close.len_utf8()..]))
}

fn parse_points(raw: &str) -> Option<f64> {
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || whole.len() > 3 || !digits(whole) {
        return None;
    }
    if raw.contains('.') && (fraction.is_empty() || fraction.len() > 2 || !digits(fraction)) {
        return None;
    }
    let value: f64 = raw.parse().ok()?;
    (value <= MAX_POINTS).then_some(value)
}
