//! modelDescription.xml parser using quick-xml
//!
//! Single pass over the document. Only the root attributes, the interface
//! elements and the direct children of `<ModelVariables>` are read; type
//! definitions, units and model structure are skipped.

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::model::{Causality, ModelDescription, ModelVariable};

const ROOT: &[u8] = b"fmiModelDescription";

/// Parse `modelDescription.xml` contents.
///
/// Fails on malformed XML or a foreign root element. Missing attributes and
/// other structural defects are left for [`ModelDescription::problems`].
pub fn parse_model_description(xml: &str) -> Result<ModelDescription> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut state = ParseState::default();

    loop {
        match reader
            .read_event_into(&mut buf)
            .with_context(|| format!("XML error at byte {}", reader.buffer_position()))?
        {
            Event::Start(e) => state.element(&e, true)?,
            Event::Empty(e) => state.element(&e, false)?,
            Event::End(_) => state.close(),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    state.finish()
}

#[derive(Default)]
struct ParseState {
    desc: ModelDescription,
    root_seen: bool,
    /// FMI 1.0 co-simulation marker
    implementation: bool,
    /// Nesting depth below `<ModelVariables>`, when inside it
    vars_depth: Option<usize>,
}

impl ParseState {
    fn element(&mut self, e: &BytesStart<'_>, opens: bool) -> Result<()> {
        let name = e.local_name();
        let name = name.as_ref();

        if !self.root_seen {
            if name != ROOT {
                bail!(
                    "Root element is <{}>, expected <fmiModelDescription>",
                    String::from_utf8_lossy(name)
                );
            }
            self.root_seen = true;
            return self.root_attributes(e);
        }

        if let Some(depth) = self.vars_depth {
            if depth == 0 {
                let var = self.variable(e)?;
                self.desc.variables.push(var);
            }
            if opens {
                self.vars_depth = Some(depth + 1);
            }
            return Ok(());
        }

        match name {
            b"CoSimulation" => self.desc.co_simulation = true,
            b"ModelExchange" => self.desc.model_exchange = true,
            b"Implementation" => self.implementation = true,
            b"ModelVariables" if opens => self.vars_depth = Some(0),
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self) {
        self.vars_depth = match self.vars_depth {
            Some(0) | None => None,
            Some(d) => Some(d - 1),
        };
    }

    fn root_attributes(&mut self, e: &BytesStart<'_>) -> Result<()> {
        for attr in e.attributes().flatten() {
            let value = attr.unescape_value()?.into_owned();
            match attr.key.local_name().as_ref() {
                b"fmiVersion" => self.desc.fmi_version = Some(value),
                b"modelName" => self.desc.model_name = Some(value),
                b"guid" | b"instantiationToken" => self.desc.guid = Some(value),
                b"generationTool" => self.desc.generation_tool = Some(value),
                _ => {}
            }
        }
        Ok(())
    }

    fn variable(&self, e: &BytesStart<'_>) -> Result<ModelVariable> {
        let mut name = String::new();
        let mut causality = None;
        let mut variability = None;
        for attr in e.attributes().flatten() {
            match attr.key.local_name().as_ref() {
                b"name" => name = attr.unescape_value()?.into_owned(),
                b"causality" => causality = Some(attr.unescape_value()?.into_owned()),
                b"variability" => variability = Some(attr.unescape_value()?.into_owned()),
                _ => {}
            }
        }

        let fmi1 = self.desc.major_version() == Some("1");
        let causality = match causality.as_deref() {
            Some(c) => Causality::parse(c),
            None if fmi1 => Causality::Internal,
            None => Causality::Local,
        };
        // FMI 1.0 has no parameter causality; parameters are marked by variability
        let causality = match (fmi1, variability.as_deref(), &causality) {
            (true, Some("parameter"), Causality::Internal | Causality::Input) => {
                Causality::Parameter
            }
            _ => causality,
        };

        Ok(ModelVariable { name, causality })
    }

    fn finish(mut self) -> Result<ModelDescription> {
        if !self.root_seen {
            bail!("Empty model description");
        }
        if self.desc.major_version() == Some("1") {
            self.desc.co_simulation = self.implementation;
            self.desc.model_exchange = !self.implementation;
        }
        Ok(self.desc)
    }
}
