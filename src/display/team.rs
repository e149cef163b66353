//! Team display formatting

use crate::models::Team;

/// Format teams as a table
pub fn format_team_list(teams: &[Team]) -> String {
    if teams.is_empty() {
        return "No teams found.\n".to_string();
    }

    let name_width = teams
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<9}  {:<8}  {}\n",
        "Name",
        "Color",
        "Status",
        "ID",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<9}  {:-<8}  {:-<10}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for team in teams {
        let status = if team.archived { "Archived" } else { "Active" };
        output.push_str(&format!(
            "{:<name_width$}  {:<9}  {:<8}  {}\n",
            team.name,
            team.color.as_deref().unwrap_or("-"),
            status,
            team.id,
            name_width = name_width,
        ));
    }

    output.push_str(&format!("\n{} team(s)\n", teams.len()));
    output
}
