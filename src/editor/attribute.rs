use crate::dom::{NodeId, XmlDocument};
use crate::error::Result;

/// Set `name` to `value` on `element`, overwriting any previous value
pub fn set_attribute(doc: &mut XmlDocument, element: NodeId, name: &str, value: &str) -> Result<()> {
    doc.set_attribute(element, name, value)?;
    log::trace!("set attribute {name}={value:?} on node {element}");
    Ok(())
}
