/// Separator between the show id and the season number in a season-scoped container id.
pub const SEASON_SEPARATOR: char = '|';

/// Split `showId|N` into its parts. Ids without a separator, with an empty
/// show id, or with a suffix that is not a plain base-10 number have no
/// season concept.
pub fn parse_season_id(id: &str) -> Option<(&str, u32)> {
    let (show_id, season) = id.rsplit_once(SEASON_SEPARATOR)?;
    if show_id.is_empty() || season.is_empty() || !season.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    season.parse().ok().map(|number| (show_id, number))
}

pub fn season_id(show_id: &str, season: u32) -> String {
    format!("{}{}{}", show_id, SEASON_SEPARATOR, season)
}

/// The id of the season after `id`, if `id` is season-scoped.
pub fn next_season_id(id: &str) -> Option<String> {
    let (show_id, season) = parse_season_id(id)?;
    season.checked_add(1).map(|next| season_id(show_id, next))
}
