//! Rule-based smart playlists
//!
//! A smart playlist is a list of `field operator value` rules AND-ed together
//! and evaluated against `tracks` on every resolve. Fields are restricted to
//! the sort fields, which map to fixed column expressions; values are always
//! bound parameters. Missing metadata compares as the field's sort default,
//! so `bpm = 120` matches tracks without a bpm.

use crate::StorageError;
use serde::{Deserialize, Serialize};
use soul_core::{error::Result, types::*, SoulError};
use sqlx::{Row, SqlitePool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOperator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Substring match, text fields only
    Contains,
}

impl RuleOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Contains => "contains",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Contains => "~",
        }
    }
}

/// One smart playlist condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartRule {
    pub field: SortField,
    pub operator: RuleOperator,
    pub value: String,
}

impl SmartRule {
    pub fn new(field: SortField, operator: RuleOperator, value: impl Into<String>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }

    /// Parse the compact form used on the command line, e.g. `bpm>=124`,
    /// `artist~daft` or `year=1999`
    pub fn parse(input: &str) -> std::result::Result<Self, StorageError> {
        let invalid = || StorageError::InvalidRule(input.to_string());

        let split = input
            .find(|c| matches!(c, '<' | '>' | '=' | '!' | '~'))
            .ok_or_else(invalid)?;
        let (field, rest) = input.split_at(split);

        let (operator, value) = [
            ("<=", RuleOperator::Lte),
            (">=", RuleOperator::Gte),
            ("!=", RuleOperator::Ne),
            ("=", RuleOperator::Eq),
            ("<", RuleOperator::Lt),
            (">", RuleOperator::Gt),
            ("~", RuleOperator::Contains),
        ]
        .iter()
        .find_map(|(symbol, op)| rest.strip_prefix(symbol).map(|value| (*op, value)))
        .ok_or_else(invalid)?;

        let field = SortField::from_str(field.trim()).ok_or_else(invalid)?;
        let rule = Self::new(field, operator, value.trim());
        rule.validate()?;
        Ok(rule)
    }

    fn validate(&self) -> std::result::Result<(), StorageError> {
        self.bound_value().map(|_| ())
    }

    fn bound_value(&self) -> std::result::Result<RuleValue, StorageError> {
        if self.field.is_numeric() {
            if self.operator == RuleOperator::Contains {
                return Err(StorageError::InvalidRule(format!(
                    "{} only supports comparisons",
                    self.field.as_str()
                )));
            }
            let number = self.value.parse::<f64>().map_err(|_| {
                StorageError::InvalidRule(format!(
                    "{} needs a number, got {:?}",
                    self.field.as_str(),
                    self.value
                ))
            })?;
            Ok(RuleValue::Number(number))
        } else {
            Ok(RuleValue::Text(self.value.clone()))
        }
    }
}

impl std::fmt::Display for SmartRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.field.as_str(), self.operator.symbol(), self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum RuleValue {
    Text(String),
    Number(f64),
}

/// Column expression for a rule field, with the sort default substituted
fn column_expr(field: SortField) -> &'static str {
    match field {
        SortField::Title => "COALESCE(title, '')",
        SortField::Artist => "COALESCE(artist, '')",
        SortField::Album => "COALESCE(album, '')",
        SortField::Key => "COALESCE(musical_key, '')",
        SortField::Year => "COALESCE(year, 0)",
        SortField::Bpm => "COALESCE(bpm, 120.0)",
        SortField::EloRating => "COALESCE(elo_rating, 1500.0)",
        SortField::TrackNumber => "COALESCE(track_number, 0)",
    }
}

/// Escape `LIKE` wildcards so `~` matches a literal substring
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Compile rules into a `WHERE` clause and its bound values
fn compile(rules: &[SmartRule]) -> std::result::Result<(String, Vec<RuleValue>), StorageError> {
    if rules.is_empty() {
        return Ok(("1 = 1".to_string(), Vec::new()));
    }

    let mut conditions = Vec::with_capacity(rules.len());
    let mut values = Vec::with_capacity(rules.len());

    for rule in rules {
        let value = rule.bound_value()?;
        let column = column_expr(rule.field);
        let (condition, value) = match (rule.operator, value) {
            (RuleOperator::Contains, RuleValue::Text(text)) => (
                format!("{} LIKE '%' || ? || '%' ESCAPE '\\'", column),
                RuleValue::Text(escape_like(&text)),
            ),
            (op, value @ RuleValue::Text(_)) => {
                (format!("{} {} ? COLLATE NOCASE", column, op.symbol()), value)
            }
            (op, value) => (format!("{} {} ?", column, op.symbol()), value),
        };
        conditions.push(condition);
        values.push(value);
    }

    Ok((conditions.join(" AND "), values))
}

/// Smart playlist with its rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartPlaylist {
    pub id: String,
    pub name: String,
    pub rules: Vec<SmartRule>,
}

/// Create a smart playlist
///
/// Rules are validated before anything is written.
pub async fn create(
    pool: &SqlitePool,
    id: &str,
    name: &str,
    rules: Vec<SmartRule>,
) -> Result<SmartPlaylist> {
    compile(&rules)?;
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO smart_playlists (id, name, created_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    for (position, rule) in rules.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO smart_playlist_rules (smart_playlist_id, position, field, operator, value)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(position as i64)
        .bind(rule.field.as_str())
        .bind(rule.operator.as_str())
        .bind(&rule.value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!("Created smart playlist {} with {} rules", id, rules.len());

    Ok(SmartPlaylist {
        id: id.to_string(),
        name: name.to_string(),
        rules,
    })
}

/// Get a smart playlist and its rules
pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<SmartPlaylist>> {
    let name: Option<String> = sqlx::query_scalar("SELECT name FROM smart_playlists WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let Some(name) = name else {
        return Ok(None);
    };

    let rows = sqlx::query(
        r#"
        SELECT field, operator, value FROM smart_playlist_rules
        WHERE smart_playlist_id = ?
        ORDER BY position
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let mut rules = Vec::with_capacity(rows.len());
    for row in rows {
        let field: String = row.try_get("field")?;
        let operator: String = row.try_get("operator")?;
        let value: String = row.try_get("value")?;

        let (Some(field), Some(operator)) =
            (SortField::from_str(&field), RuleOperator::from_str(&operator))
        else {
            return Err(StorageError::InvalidRule(format!(
                "{} {} {} in smart playlist {}",
                field, operator, value, id
            ))
            .into());
        };
        rules.push(SmartRule::new(field, operator, value));
    }

    Ok(Some(SmartPlaylist {
        id: id.to_string(),
        name,
        rules,
    }))
}

/// Evaluate a smart playlist against the current library
///
/// An unknown playlist, or one whose stored rules no longer compile, resolves
/// to no tracks.
pub async fn resolve(pool: &SqlitePool, id: &str) -> Result<Vec<TrackId>> {
    let playlist = match get_by_id(pool, id).await {
        Ok(Some(playlist)) => playlist,
        Ok(None) => return Ok(Vec::new()),
        Err(SoulError::InvalidInput(msg)) => {
            tracing::warn!("Smart playlist {} not evaluated: {}", id, msg);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    let (clause, values) = match compile(&playlist.rules) {
        Ok(compiled) => compiled,
        Err(e) => {
            tracing::warn!("Smart playlist {} not evaluated: {}", id, e);
            return Ok(Vec::new());
        }
    };

    let sql = format!("SELECT id FROM tracks WHERE {} ORDER BY id", clause);
    let mut query = sqlx::query_scalar::<_, String>(&sql);
    for value in values {
        query = match value {
            RuleValue::Text(text) => query.bind(text),
            RuleValue::Number(number) => query.bind(number),
        };
    }

    let ids = query.fetch_all(pool).await?;
    tracing::debug!("Smart playlist {} matched {} tracks", id, ids.len());
    Ok(ids.into_iter().map(TrackId::new).collect())
}

/// Delete a smart playlist and its rules
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM smart_playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_compact_rules() {
        let rule = SmartRule::parse("bpm>=124").unwrap();
        assert_eq!(rule, SmartRule::new(SortField::Bpm, RuleOperator::Gte, "124"));

        let rule = SmartRule::parse("artist~daft").unwrap();
        assert_eq!(rule, SmartRule::new(SortField::Artist, RuleOperator::Contains, "daft"));

        let rule = SmartRule::parse("elo != 1500").unwrap();
        assert_eq!(rule, SmartRule::new(SortField::EloRating, RuleOperator::Ne, "1500"));
    }

    #[test]
    fn parse_rejects_bad_rules() {
        assert!(SmartRule::parse("bpm").is_err());
        assert!(SmartRule::parse("mood=happy").is_err());
        assert!(SmartRule::parse("year=late").is_err());
        assert!(SmartRule::parse("bpm~12").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let rule = SmartRule::new(SortField::Year, RuleOperator::Lt, "2000");
        assert_eq!(SmartRule::parse(&rule.to_string()).unwrap(), rule);
    }

    #[test]
    fn compile_binds_values_and_never_inlines_them() {
        let rules = vec![
            SmartRule::new(SortField::Title, RuleOperator::Eq, "x' OR 1=1 --"),
            SmartRule::new(SortField::Year, RuleOperator::Gte, "1990"),
        ];

        let (clause, values) = compile(&rules).unwrap();

        assert_eq!(
            clause,
            "COALESCE(title, '') = ? COLLATE NOCASE AND COALESCE(year, 0) >= ?"
        );
        assert_eq!(
            values,
            vec![
                RuleValue::Text("x' OR 1=1 --".to_string()),
                RuleValue::Number(1990.0)
            ]
        );
    }

    #[test]
    fn contains_escapes_like_wildcards() {
        let rules = vec![SmartRule::new(SortField::Title, RuleOperator::Contains, "100%_a\\b")];

        let (clause, values) = compile(&rules).unwrap();

        assert_eq!(clause, "COALESCE(title, '') LIKE '%' || ? || '%' ESCAPE '\\'");
        assert_eq!(values, vec![RuleValue::Text("100\\%\\_a\\\\b".to_string())]);
    }

    #[test]
    fn no_rules_matches_everything() {
        let (clause, values) = compile(&[]).unwrap();
        assert_eq!(clause, "1 = 1");
        assert!(values.is_empty());
    }
}
