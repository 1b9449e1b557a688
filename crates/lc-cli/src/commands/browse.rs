use lc_core::{Annotations, Measurement, ObservedObject};
use lc_explorer::Explorer;
use serde::Serialize;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::cli::commands::{ObjectArg, SelectArgs};
use crate::commands::target;
use crate::output::output;

/// One line of `lce list`.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectSummary {
    pub index: usize,
    /// `*` on the selected object.
    pub current: &'static str,
    #[serde(rename = "objectId")]
    pub id: String,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    pub points: usize,
    pub name: String,
    pub category: String,
    pub snapshot: bool,
}

impl ObjectSummary {
    fn new(index: usize, object: &ObservedObject, selected: bool) -> Self {
        Self {
            index,
            current: if selected { "*" } else { "" },
            id: object.id.clone(),
            ra: object.ra,
            dec: object.dec,
            points: object.measurements.len(),
            name: object.annotations.name.clone(),
            category: object.annotations.category.clone(),
            snapshot: object.snapshot.is_some(),
        }
    }

    pub fn list(explorer: &Explorer) -> Vec<Self> {
        let state = explorer.state();
        state
            .objects()
            .iter()
            .enumerate()
            .map(|(index, object)| Self::new(index, object, index == state.current_index()))
            .collect()
    }

    pub fn selected(explorer: &Explorer) -> anyhow::Result<Self> {
        let object = explorer.current()?;
        Ok(Self::new(explorer.state().current_index(), object, true))
    }
}

/// Full view of one object for `lce show`. The snapshot is reduced to its size.
#[derive(Debug, Serialize)]
struct ObjectDetail<'a> {
    index: usize,
    #[serde(rename = "objectId")]
    id: &'a str,
    ra: Option<f64>,
    dec: Option<f64>,
    annotations: &'a Annotations,
    snapshot_bytes: Option<usize>,
    measurements: &'a [Measurement],
}

/// Handle `lce list`.
pub fn handle_list(explorer: &Explorer, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&ObjectSummary::list(explorer), flags.format)
}

/// Handle `lce show`.
pub fn handle_show(args: &ObjectArg, explorer: &Explorer, flags: &GlobalFlags) -> anyhow::Result<()> {
    let (index, object) = match args.object.as_deref() {
        Some(id) => {
            let index = explorer.state().index_of(id)?;
            (index, &explorer.state().objects()[index])
        }
        None => (explorer.state().current_index(), explorer.current()?),
    };

    if flags.format == OutputFormat::Table {
        // A key/value table would collapse the series into a count.
        return output(&object.measurements, flags.format);
    }
    output(
        &ObjectDetail {
            index,
            id: &object.id,
            ra: object.ra,
            dec: object.dec,
            annotations: &object.annotations,
            snapshot_bytes: object.snapshot.as_ref().map(String::len),
            measurements: &object.measurements,
        },
        flags.format,
    )
}

/// Handle `lce select`.
pub fn handle_select(
    args: &SelectArgs,
    explorer: &mut Explorer,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match (&args.id, args.index) {
        (Some(id), _) => target(explorer, Some(id))?,
        (None, Some(index)) => {
            explorer.select(index)?;
        }
        (None, None) => anyhow::bail!("give an object id or --index"),
    }
    output(&ObjectSummary::selected(explorer)?, flags.format)
}

/// Handle `lce next` (`delta = 1`) and `lce prev` (`delta = -1`).
pub fn handle_step(delta: isize, explorer: &mut Explorer, flags: &GlobalFlags) -> anyhow::Result<()> {
    if delta >= 0 {
        explorer.next()?;
    } else {
        explorer.prev()?;
    }
    output(&ObjectSummary::selected(explorer)?, flags.format)
}

#[cfg(test)]
mod tests {
    use lc_config::LightcurveConfig;
    use lc_core::ObservedObject;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn explorer_with(ids: &[&str], dir: &TempDir) -> Explorer {
        let path = dir.path().join("state.json");
        let objects = ids
            .iter()
            .map(|id| ObservedObject::new(*id, Some(150.0), Some(2.0)))
            .collect::<Vec<_>>();
        std::fs::write(&path, serde_json::to_string(&objects).unwrap()).unwrap();

        let mut config = LightcurveConfig::default();
        config.store.path = path.to_string_lossy().into_owned();
        Explorer::from_config(&config).unwrap()
    }

    #[test]
    fn list_marks_the_selected_object() {
        let dir = TempDir::new().unwrap();
        let mut explorer = explorer_with(&["a", "b", "c"], &dir);
        explorer.select(1).unwrap();

        let marks = ObjectSummary::list(&explorer)
            .into_iter()
            .map(|summary| (summary.id, summary.current))
            .collect::<Vec<_>>();
        assert_eq!(
            marks,
            vec![
                ("a".to_string(), ""),
                ("b".to_string(), "*"),
                ("c".to_string(), ""),
            ]
        );
    }

    #[test]
    fn selection_survives_reopening() {
        let dir = TempDir::new().unwrap();
        let mut explorer = explorer_with(&["a", "b"], &dir);
        handle_step(1, &mut explorer, &flags()).unwrap();
        drop(explorer);

        let mut config = LightcurveConfig::default();
        config.store.path = dir.path().join("state.json").to_string_lossy().into_owned();
        let reopened = Explorer::from_config(&config).unwrap();
        assert_eq!(ObjectSummary::selected(&reopened).unwrap().id, "b");
    }

    #[test]
    fn empty_collection_has_no_selection() {
        let dir = TempDir::new().unwrap();
        let explorer = explorer_with(&[], &dir);
        assert!(ObjectSummary::list(&explorer).is_empty());
        assert!(ObjectSummary::selected(&explorer).is_err());
    }

    fn flags() -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Raw,
            quiet: true,
            verbose: false,
            state: None,
        }
    }
}
