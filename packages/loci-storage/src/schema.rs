pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_images.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_images.sql")),
				"tables/002_locations.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_locations.sql")),
				"tables/003_location_reviews.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_location_reviews.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn expands_every_table_include() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir "));

		for table in ["images", "locations", "location_reviews"] {
			assert!(sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")), "missing {table}");
		}
	}
}
