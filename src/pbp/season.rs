/// Season year from a stats game id.
///
/// Ids are `LLTYYNNNNN`: league (`00` NBA, `10` WNBA, `20` G League), game
/// type, two-digit season year and game number. Ids that went through a
/// numeric column lose their leading zeros, so shorter all-digit ids are
/// padded back to ten characters first.
pub fn from_game_id(game_id: &str) -> Option<i32> {
    let id = game_id.trim();
    let id = id.strip_suffix(".0").unwrap_or(id);
    if id.is_empty() || id.len() > 10 || !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let id = format!("{:0>10}", id);
    if !matches!(&id[0..2], "00" | "10" | "20") {
        return None;
    }
    let yy: i32 = id[3..5].parse().ok()?;
    Some(if yy >= 90 { 1900 + yy } else { 2000 + yy })
}

/// First four-digit year at the start of a label such as `2014`, `2014.0`
/// or `2006-07`.
pub fn from_label(label: &str) -> Option<i32> {
    let label = label.trim();
    if label.len() < 4 || !label.is_char_boundary(4) {
        return None;
    }
    let (year, rest) = label.split_at(4);
    if !year.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if rest.chars().next().map_or(false, |c| c.is_ascii_digit()) {
        return None;
    }
    year.parse().ok()
}

/// Season from a per-team export name: `wnba_2014_Aces_pbp.csv`,
/// `Celtics_2006-07_pbp.csv`, `2006-07_Celtics_pbp.csv`.
pub fn from_file_name(name: &str) -> Option<i32> {
    let stem = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    stem.split('_').find_map(from_label)
}

/// Season label column value when usable, otherwise the game id.
pub fn resolve(label: Option<&str>, game_id: &str) -> Option<i32> {
    label.and_then(from_label).or_else(|| from_game_id(game_id))
}
