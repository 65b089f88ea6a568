/// Database row types — these map directly to SQLite rows.
/// Distinct from diet-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MealRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_on_the_diet: bool,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

pub struct NewMeal<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub is_on_the_diet: bool,
}
