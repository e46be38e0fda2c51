//! Facsimile CLI library
//!
//! This module contains the core CLI logic: load a diagram file, copy a
//! selection of its elements and paste them into a target element.

pub mod error_adapter;

mod args;
mod config;
mod error;

pub use args::Args;
pub use error::CliError;

use std::fs;

use log::{info, warn};

use facsimile::{
    CopyPaste, PasteContext, PasteOutcome, factory::DefaultElementFactory, geometry::Point,
    modeling::Modeler,
};
use facsimile_core::{Diagram, DiagramFile, Id};

/// Run the Facsimile CLI application
///
/// Reads the input diagram, copies the selected elements, pastes them into
/// the target centered on the requested point and writes the resulting
/// diagram to the output file. When nothing can be copied the diagram is
/// written unchanged.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed diagram files
/// - Invalid `--at` points or a missing paste target
/// - Unknown selected element ids
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let file: DiagramFile =
        toml::from_str(&source).map_err(|err| CliError::format(&args.input, source.as_str(), &err))?;
    let diagram = Diagram::from_file(file)?;

    let selection = parse_selection(&args.select);
    let target = resolve_target(&diagram, args.target.as_deref())?;
    let point = parse_point(&args.at)?;

    let mut copy_paste =
        CopyPaste::new(app_config).with_factory(DefaultElementFactory::for_diagram(&diagram));
    let tree = copy_paste.copy(&diagram, &selection)?;

    let mut modeler = Modeler::new(diagram);
    if tree.is_some_and(|tree| !tree.is_empty()) {
        let context = PasteContext::at(target, point);
        if let PasteOutcome::Created(created) = copy_paste.paste(&context, &mut modeler)? {
            info!(created = created.len(), target:?; "Elements pasted");
        }
    } else {
        warn!(selected = selection.len(); "Nothing could be copied, writing diagram unchanged");
    }

    let output = toml::to_string_pretty(&modeler.diagram().to_file())?;
    fs::write(&args.output, output)?;

    info!(output_file = args.output; "Diagram written successfully");

    Ok(())
}

/// Turns the `--select` values into ids, skipping empty entries.
fn parse_selection(select: &[String]) -> Vec<Id> {
    select
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(Id::new)
        .collect()
}

fn resolve_target(diagram: &Diagram, target: Option<&str>) -> Result<Id, CliError> {
    match target {
        Some(name) => {
            let id = Id::new(name.trim());
            diagram.element(id)?;
            Ok(id)
        }
        None => diagram.root().ok_or_else(|| {
            CliError::Argument("no --target given and the diagram has no root".to_string())
        }),
    }
}

/// Parses an `x,y` point.
fn parse_point(value: &str) -> Result<Point, CliError> {
    let invalid = || CliError::Argument(format!("invalid point '{value}'"));

    let (x, y) = value.split_once(',').ok_or_else(invalid)?;
    let x: f32 = x.trim().parse().map_err(|_| invalid())?;
    let y: f32 = y.trim().parse().map_err(|_| invalid())?;
    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use facsimile_core::Element;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10,-2.5").unwrap(), Point::new(10.0, -2.5));
        assert_eq!(parse_point(" 1 , 2 ").unwrap(), Point::new(1.0, 2.0));
        assert!(matches!(parse_point("10"), Err(CliError::Argument(_))));
        assert!(matches!(parse_point("a,b"), Err(CliError::Argument(_))));
    }

    #[test]
    fn test_parse_selection() {
        let select = vec!["a".to_string(), " b ".to_string(), String::new()];

        assert_eq!(parse_selection(&select), vec![Id::new("a"), Id::new("b")]);
    }

    #[test]
    fn test_resolve_target() {
        let diagram = Diagram::from_elements(
            Some(Id::new("root")),
            [
                Element::new(Id::new("root")),
                Element::new(Id::new("lane")).with_parent(Id::new("root")),
            ],
        )
        .unwrap();

        assert_eq!(resolve_target(&diagram, None).unwrap(), Id::new("root"));
        assert_eq!(resolve_target(&diagram, Some("lane")).unwrap(), Id::new("lane"));
        assert!(matches!(
            resolve_target(&diagram, Some("nope")),
            Err(CliError::Diagram(_))
        ));
        assert!(matches!(
            resolve_target(&Diagram::new(), None),
            Err(CliError::Argument(_))
        ));
    }
}
