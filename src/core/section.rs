// A parser bound to one resolved section name.
use crate::core::error::Error;
use crate::core::parser::CfgParser;
use crate::core::value::Value;

/// Forwards to the parser with the section pre-filled. Holds no other state.
#[derive(Clone, Debug)]
pub struct SectionView<'p> {
    parser: &'p CfgParser,
    section: String,
}

impl<'p> SectionView<'p> {
    pub(crate) fn new(parser: &'p CfgParser, section: String) -> Self {
        Self { parser, section }
    }

    /// Full section name as written in the source.
    pub fn name(&self) -> &str {
        &self.section
    }

    pub fn options(&self) -> Result<Vec<&'p str>, Error> {
        self.parser.options(&self.section)
    }

    pub fn has_option(&self, option: &str) -> bool {
        self.parser.has_option(&self.section, option)
    }

    pub fn items(&self) -> Result<Vec<(&'p str, &'p str)>, Error> {
        self.parser.items(&self.section)
    }

    pub fn get(&self, option: &str) -> Result<&'p str, Error> {
        self.parser.get(&self.section, option)
    }

    pub fn get_or(&self, option: &str, default: &'p str) -> Result<&'p str, Error> {
        self.parser.get_or(&self.section, option, default)
    }

    pub fn get_eval(&self, option: &str) -> Result<Value, Error> {
        self.parser.get_eval(&self.section, option)
    }

    pub fn get_eval_or(&self, option: &str, default: Value) -> Result<Value, Error> {
        self.parser.get_eval_or(&self.section, option, default)
    }

    pub fn get_list(&self, option: &str) -> Result<Vec<&'p str>, Error> {
        self.parser.get_list(&self.section, option)
    }

    pub fn get_list_or(&self, option: &str, default: Vec<&'p str>) -> Result<Vec<&'p str>, Error> {
        self.parser.get_list_or(&self.section, option, default)
    }

    pub fn get_list_eval(&self, option: &str) -> Result<Vec<Value>, Error> {
        self.parser.get_list_eval(&self.section, option)
    }

    pub fn get_list_eval_or(&self, option: &str, default: Vec<Value>) -> Result<Vec<Value>, Error> {
        self.parser.get_list_eval_or(&self.section, option, default)
    }
}
