use tracing::debug;

use crate::error::Error;
use crate::id::{IdProvider, UuidV4};
use crate::item::ContainerItem;
use crate::model::ItemKind;

const START_MARKER: &str = "#Start:";
const END_MARKER: &str = "#End";

pub fn parse_document(input: &str) -> Result<Vec<ContainerItem>, Error> {
    parse_document_with(input, &UuidV4)
}

// blank lines between blocks are skipped, any other text outside a block is an error
pub fn parse_document_with(input: &str, ids: &dyn IdProvider) -> Result<Vec<ContainerItem>, Error> {
    let mut items = Vec::new();
    let mut open: Option<(ItemKind, usize, Vec<&str>)> = None;

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let marker = line.trim();

        if let Some(label) = marker.strip_prefix(START_MARKER) {
            if let Some((_, start, _)) = &open {
                return Err(Error::malformed_document(
                    line_number,
                    format!("block opened at line {start} is not closed"),
                ));
            }
            open = Some((ItemKind::from_label(label)?, line_number, Vec::new()));
            continue;
        }

        if marker == END_MARKER {
            let Some((kind, start, body)) = open.take() else {
                return Err(Error::malformed_document(line_number, "#End without #Start"));
            };
            let body = body.join("\n");
            debug!(kind = %kind, start, end = line_number, "parsing block");
            let source = (!body.trim().is_empty()).then_some(body.as_str());
            items.push(ContainerItem::parse_with(kind, source, ids)?);
            continue;
        }

        match open.as_mut() {
            Some((_, _, body)) => body.push(line),
            None if marker.is_empty() => {}
            None => {
                return Err(Error::malformed_document(
                    line_number,
                    "text outside of a #Start/#End block",
                ));
            }
        }
    }

    if let Some((_, start, _)) = open {
        return Err(Error::malformed_document(
            start,
            "block is missing its #End marker",
        ));
    }

    Ok(items)
}

pub fn render_document(items: &[ContainerItem]) -> String {
    items
        .iter()
        .map(ContainerItem::render)
        .filter(|rendered| !rendered.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
