//! Terminal output helpers

pub mod table;

use anyhow::{anyhow, Result};
use console::style;
use voquest_core::dal::DalResults;

/// How the user asked for results to be rendered
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Emit JSON instead of a table
    pub json: bool,
    /// Cap on table rows; 0 lifts the cap
    pub limit: usize,
    /// Restrict output to these columns, in this order
    pub columns: Option<Vec<String>>,
}

/// Number of rows a table should show under the given options
pub fn display_limit(opts: &OutputOptions, total: usize) -> usize {
    if opts.limit == 0 {
        total
    } else {
        opts.limit.min(total)
    }
}

/// Resolve `--columns` names against the result set.
///
/// `None` means no restriction was asked for. An unknown name is an error
/// naming the columns that do exist, since a typo silently dropping a
/// column is worse than failing.
fn selected_indices(results: &DalResults, opts: &OutputOptions) -> Result<Option<Vec<usize>>> {
    let Some(wanted) = &opts.columns else {
        return Ok(None);
    };
    let mut indices = Vec::with_capacity(wanted.len());
    for name in wanted {
        let index = results.column_index(name).ok_or_else(|| {
            anyhow!(
                "no column named {:?} (available: {})",
                name,
                results.fieldnames().join(", ")
            )
        })?;
        indices.push(index);
    }
    Ok(Some(indices))
}

/// Print a generic result set as a table or JSON per the options
pub fn print_results(results: &DalResults, opts: &OutputOptions) -> Result<()> {
    if opts.json {
        return print_json(results, opts);
    }
    let names = results.fieldnames();
    let selection = selected_indices(results, opts)?;
    let headers: Vec<&str> = match &selection {
        Some(indices) => indices.iter().map(|&i| names[i]).collect(),
        None => names,
    };
    let rows: Vec<Vec<String>> = results
        .iter()
        .take(display_limit(opts, results.len()))
        .map(|record| {
            let values = record.values();
            match &selection {
                Some(indices) => indices.iter().map(|&i| values[i].to_string()).collect(),
                None => values.iter().map(|v| v.to_string()).collect(),
            }
        })
        .collect();
    table::print(&headers, &rows);
    print_row_count(rows.len(), results.len());
    Ok(())
}

/// Serialize every row as a JSON array of objects keyed by column name.
///
/// JSON output is meant for machines, so the row limit does not apply;
/// the column restriction does.
pub fn print_json(results: &DalResults, opts: &OutputOptions) -> Result<()> {
    let names = results.fieldnames();
    let selection = selected_indices(results, opts)?;
    let mut rows = Vec::with_capacity(results.len());
    for record in results.iter() {
        let values = record.values();
        let mut object = serde_json::Map::new();
        match &selection {
            Some(indices) => {
                for &i in indices {
                    object.insert(names[i].to_string(), serde_json::to_value(&values[i])?);
                }
            }
            None => {
                for (name, value) in names.iter().zip(values) {
                    object.insert(name.to_string(), serde_json::to_value(value)?);
                }
            }
        }
        rows.push(serde_json::Value::Object(object));
    }
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Footer noting how much of the result set is shown
pub fn print_row_count(shown: usize, total: usize) {
    let note = if shown < total {
        format!("{} of {} rows shown (raise --limit to see more)", shown, total)
    } else {
        format!("{} rows", total)
    };
    println!("{}", style(note).dim());
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use voquest_core::votable::VoTable;

    const TWO_COLUMNS: &str = r#"<?xml version="1.0"?>
<VOTABLE version="1.1">
  <RESOURCE>
    <TABLE>
      <FIELD name="RA" datatype="double"/>
      <FIELD name="Name" datatype="char" arraysize="*"/>
      <DATA><TABLEDATA>
        <TR><TD>83.633</TD><TD>M1</TD></TR>
      </TABLEDATA></DATA>
    </TABLE>
  </RESOURCE>
</VOTABLE>"#;

    fn results() -> DalResults {
        let votable = VoTable::parse_str(TWO_COLUMNS).unwrap();
        DalResults::from_votable(votable, Url::parse("http://example.org/q").unwrap()).unwrap()
    }

    fn opts(columns: Option<Vec<String>>) -> OutputOptions {
        OutputOptions {
            json: false,
            limit: 0,
            columns,
        }
    }

    #[test]
    fn test_selection_respects_order_and_case() {
        let results = results();
        let opts = opts(Some(vec!["name".to_string(), "RA".to_string()]));
        let indices = selected_indices(&results, &opts).unwrap().unwrap();
        assert_eq!(indices, vec![1, 0]);
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let results = results();
        let opts = opts(Some(vec!["nope".to_string()]));
        let err = selected_indices(&results, &opts).unwrap_err();
        assert!(err.to_string().contains("RA, Name"));
    }

    #[test]
    fn test_no_selection_passes_through() {
        let results = results();
        assert!(selected_indices(&results, &opts(None)).unwrap().is_none());
    }

    #[test]
    fn test_display_limit() {
        assert_eq!(display_limit(&opts(None), 100), 100);
        let capped = OutputOptions {
            json: false,
            limit: 10,
            columns: None,
        };
        assert_eq!(display_limit(&capped, 100), 10);
        assert_eq!(display_limit(&capped, 3), 3);
    }
}
