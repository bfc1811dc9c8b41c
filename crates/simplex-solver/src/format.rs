use crate::solution::Solution;
use crate::tableau::Tableau;

/// Renders tableaux and solutions as text, rounding half-up to a fixed
/// number of decimal places.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    precision: usize,
}

impl Default for Formatter {
    fn default() -> Self {
        Self { precision: 4 }
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Round half away from zero; never yields negative zero
    pub fn round(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.precision as i32);
        let rounded = (value * scale).round() / scale;
        if rounded == 0.0 { 0.0 } else { rounded }
    }

    /// Rounded value without trailing zeros (`2.5`, `100`, `0.3333`)
    pub fn number(&self, value: f64) -> String {
        let mut text = format!("{:.*}", self.precision, self.round(value));
        if text.contains('.') {
            let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
            text.truncate(trimmed);
        }
        text
    }

    /// Tableau as an aligned grid: `BV EQ Z <variables> RHS` header, the
    /// objective row, then one row per basic variable.
    pub fn tableau(&self, tableau: &Tableau) -> String {
        let label = tableau.objective_label().to_string();
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(tableau.matrix().len() + 1);

        let mut header = vec!["BV".to_string(), "EQ".to_string(), label.clone()];
        header.extend(tableau.variables().iter().map(|v| v.label().to_string()));
        header.push("RHS".to_string());
        grid.push(header);

        for (i, row) in tableau.matrix().iter().enumerate() {
            let mut cells = Vec::with_capacity(row.len() + 3);
            if i == 0 {
                cells.extend([label.clone(), "0".to_string(), "1".to_string()]);
            } else {
                let basic = tableau.basic_variables()[i - 1];
                let name = tableau.variables().at(basic).map_or("?", |v| v.label());
                cells.extend([name.to_string(), i.to_string(), "0".to_string()]);
            }
            cells.extend(row.iter().map(|&v| self.number(v)));
            grid.push(cells);
        }

        let columns = grid[0].len();
        let widths: Vec<usize> = (0..columns)
            .map(|j| grid.iter().map(|r| r.get(j).map_or(0, |c| c.len())).max().unwrap_or(0))
            .collect();

        grid.iter()
            .map(|cells| {
                cells
                    .iter()
                    .zip(&widths)
                    .map(|(cell, &w)| format!("{:>w$}", cell, w = w))
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Optimal value followed by one `name = value` line per decision variable
    pub fn solution(&self, solution: &Solution) -> String {
        let mut lines = vec![format!("Optimal value: {}", self.number(solution.objective_value))];
        for v in &solution.values {
            lines.push(format!("{} = {}", v.name, self.number(v.value)));
        }
        lines.join("\n")
    }
}
