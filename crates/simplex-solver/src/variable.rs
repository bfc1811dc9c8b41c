/// What role a variable plays in the tableau
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Caller-declared decision variable (X1..Xn)
    Decision,
    /// Slack added for a `<=` constraint
    Slack,
    /// Surplus added for a `>=` constraint
    Surplus,
    /// Artificial added for a `>=` or `=` constraint, removed after phase 1
    Artificial,
}

impl VariableKind {
    pub fn is_synthesized(self) -> bool {
        self != VariableKind::Decision
    }
}

/// A single column of the linear program.
///
/// `index` is 1-based and only ever grows: synthesized variables continue
/// numbering after the last decision variable.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    index: usize,
    kind: VariableKind,
    alias: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, index: usize, kind: VariableKind) -> Self {
        assert!(index > 0, "variable indices are 1-based");
        Self {
            name: name.into(),
            index,
            kind,
            alias: None,
        }
    }

    pub fn decision(name: impl Into<String>, index: usize) -> Self {
        Self::new(name, index, VariableKind::Decision)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn set_alias(&mut self, alias: impl Into<String>) {
        self.alias = Some(alias.into());
    }

    /// The alias when one is set, the name otherwise
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Ordered set of variables, sorted by index.
///
/// Every equation and every tableau takes its column order from a registry.
/// Each solve works on its own registry value; nothing is shared globally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `X1..Xn` with indices `1..n`
    pub fn with_decision_variables(count: usize) -> Self {
        Self::with_prefix("X", count)
    }

    pub fn with_prefix(prefix: &str, count: usize) -> Self {
        let mut registry = Self::new();
        for i in 1..=count {
            registry.insert(Variable::decision(format!("{}{}", prefix, i), i));
        }
        registry
    }

    /// Insert a variable, keeping index order.
    ///
    /// Panics on a duplicate name or index: callers own the naming scheme,
    /// so a clash is a programming error rather than bad input.
    pub fn insert(&mut self, variable: Variable) {
        assert!(
            !self.variables.iter().any(|v| v.is_named(&variable.name)),
            "variable {} is already registered",
            variable.name
        );
        match self.variables.binary_search_by_key(&variable.index, |v| v.index) {
            Ok(_) => panic!("variable index {} is already registered", variable.index),
            Err(pos) => self.variables.insert(pos, variable),
        }
    }

    /// Append a variable with the next free index and return that index
    pub fn push(&mut self, name: impl Into<String>, kind: VariableKind) -> usize {
        let index = self.next_index();
        self.insert(Variable::new(name, index, kind));
        index
    }

    pub fn next_index(&self) -> usize {
        self.variables.last().map_or(1, |v| v.index + 1)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.variables.iter()
    }

    /// Variable at a column position
    pub fn at(&self, column: usize) -> Option<&Variable> {
        self.variables.get(column)
    }

    pub fn get(&self, index: usize) -> Option<&Variable> {
        self.position(index).map(|pos| &self.variables[pos])
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Variable> {
        self.position(index).map(move |pos| &mut self.variables[pos])
    }

    /// Column position of the variable with this index
    pub fn position(&self, index: usize) -> Option<usize> {
        self.variables.binary_search_by_key(&index, |v| v.index).ok()
    }

    /// All variables whose name matches, ignoring ASCII case
    pub fn matching<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Variable> + 'a {
        self.variables.iter().filter(move |v| v.is_named(name))
    }

    pub fn find(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.is_named(name))
    }

    pub fn decision_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|v| v.kind == VariableKind::Decision)
    }

    /// Drop every variable the predicate rejects
    pub fn retain(&mut self, keep: impl FnMut(&Variable) -> bool) {
        self.variables.retain(keep);
    }
}

impl<'a> IntoIterator for &'a VariableRegistry {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_variables_are_numbered_from_one() {
        let registry = VariableRegistry::with_decision_variables(3);
        let names: Vec<_> = registry.iter().map(|v| v.name()).collect();
        assert_eq!(names, vec!["X1", "X2", "X3"]);
        assert_eq!(registry.get(2).map(|v| v.name()), Some("X2"));
        assert_eq!(registry.next_index(), 4);
    }

    #[test]
    fn test_insert_keeps_index_order() {
        let mut registry = VariableRegistry::new();
        registry.insert(Variable::decision("X3", 3));
        registry.insert(Variable::decision("X1", 1));
        registry.insert(Variable::decision("X2", 2));
        let indices: Vec<_> = registry.iter().map(|v| v.index()).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(registry.position(3), Some(2));
    }

    #[test]
    fn test_push_continues_after_last_index() {
        let mut registry = VariableRegistry::with_decision_variables(2);
        let s1 = registry.push("S1", VariableKind::Slack);
        let a1 = registry.push("A1", VariableKind::Artificial);
        assert_eq!((s1, a1), (3, 4));
        assert_eq!(registry.decision_variables().count(), 2);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let registry = VariableRegistry::with_decision_variables(2);
        assert_eq!(registry.find("x2").map(|v| v.index()), Some(2));
        assert!(registry.find("x7").is_none());
    }

    #[test]
    fn test_found_variable_outlives_query() {
        let registry = VariableRegistry::with_decision_variables(2);
        let found = {
            let name = String::from("x1");
            registry.find(&name)
        };
        assert_eq!(found.map(|v| v.name()), Some("X1"));
    }

    #[test]
    fn test_alias_replaces_label() {
        let mut registry = VariableRegistry::with_decision_variables(1);
        let x1 = registry.get_mut(1).unwrap();
        x1.set_alias("chairs");
        assert_eq!(registry.get(1).unwrap().label(), "chairs");
        assert_eq!(registry.get(1).unwrap().name(), "X1");
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_name_panics() {
        let mut registry = VariableRegistry::with_decision_variables(1);
        registry.insert(Variable::decision("x1", 9));
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn test_duplicate_index_panics() {
        let mut registry = VariableRegistry::with_decision_variables(1);
        registry.insert(Variable::decision("Y", 1));
    }
}
