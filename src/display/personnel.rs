//! Personnel display formatting

use crate::models::Personnel;

/// Format staff members as a table
pub fn format_personnel_list(personnel: &[Personnel]) -> String {
    if personnel.is_empty() {
        return "No personnel found.\n".to_string();
    }

    let name_width = personnel
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);
    let role_width = personnel
        .iter()
        .map(|p| p.role.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<role_width$}  {}\n",
        "Name",
        "Role",
        "ID",
        name_width = name_width,
        role_width = role_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<role_width$}  {:-<10}\n",
        "",
        "",
        "",
        name_width = name_width,
        role_width = role_width,
    ));

    for member in personnel {
        output.push_str(&format!(
            "{:<name_width$}  {:<role_width$}  {}\n",
            member.name,
            member.role.to_string(),
            member.id,
            name_width = name_width,
            role_width = role_width,
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonnelRole;

    #[test]
    fn test_format_personnel_list() {
        let staff = vec![
            Personnel::new("Jordan", PersonnelRole::HeadCoach),
            Personnel::new("Alex", PersonnelRole::Physio),
        ];

        let output = format_personnel_list(&staff);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("Jordan"));
        assert!(lines[2].contains("Head coach"));
        assert!(lines[3].contains(staff[1].id.as_str()));
    }
}
