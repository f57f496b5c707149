//! Slot list parsing for `--slots`.

use std::collections::BTreeSet;

use extattr_connector::slot::SLOT_COUNT;

/// Parse `all`, `3`, `1,3,5`, `1-15` or any comma-separated mix.
pub fn parse_slot_list(input: &str) -> Result<BTreeSet<u8>, String> {
    let max = SLOT_COUNT as u8;
    let input = input.trim();

    if input.eq_ignore_ascii_case("all") {
        return Ok((1..=max).collect());
    }

    let mut slots = BTreeSet::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (parse_number(a)?, parse_number(b)?),
            None => {
                let n = parse_number(part)?;
                (n, n)
            }
        };
        if start == 0 || end > max || start > end {
            return Err(format!("'{part}' is not within 1-{max}"));
        }
        slots.extend(start..=end);
    }

    if slots.is_empty() {
        return Err("no slots given".to_string());
    }
    Ok(slots)
}

/// Parse a single slot number for `--slot`.
pub fn parse_slot(input: &str) -> Result<u8, String> {
    let n = parse_number(input)?;
    if n == 0 || usize::from(n) > SLOT_COUNT {
        return Err(format!("{n} is not within 1-{SLOT_COUNT}"));
    }
    Ok(n)
}

fn parse_number(s: &str) -> Result<u8, String> {
    s.trim()
        .parse::<u8>()
        .map_err(|_| format!("'{}' is not a slot number", s.trim()))
}
