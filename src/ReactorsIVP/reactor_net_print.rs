//! # Pretty Printing for Reactor Networks
//!
//! Tables of the reactor, its flow connections, the unknowns of the IVP and the
//! symbolic right-hand side, formatted with prettytable.

use super::reactor_net::ReactorNet;
use super::reactors::ReactorModel;

impl ReactorNet {
    /// Displays a summary of the network: reactor state, inlets, outlets and integrator settings.
    pub fn pretty_print_task(&self) {
        use prettytable::{Table, row};

        println!("\n=== REACTOR NETWORK SUMMARY ===");
        println!("Time: {:.6e} s", self.time());
        self.reactor().pretty_print();

        if !self.reactor().inlets().is_empty() {
            println!("\nInlets:");
            let mut table = Table::new();
            table.add_row(row!["Upstream", "mdot (kg/s)", "T (K)", "h (J/kg)"]);
            for inlet in self.reactor().inlets() {
                table.add_row(row![
                    inlet.upstream.name,
                    format!("{:.4e}", inlet.controller.mass_flow_rate()),
                    format!("{:.2}", inlet.upstream.gas().T()),
                    format!("{:.4e}", inlet.upstream.enthalpy_mass())
                ]);
            }
            table.printstd();
        }

        if !self.reactor().outlets().is_empty() {
            println!("\nOutlets:");
            let mut table = Table::new();
            table.add_row(row!["Downstream", "mdot (kg/s)"]);
            for outlet in self.reactor().outlets() {
                let name = outlet
                    .downstream
                    .as_ref()
                    .map(|r| r.name.clone())
                    .unwrap_or_else(|| "-".to_owned());
                table.add_row(row![name, format!("{:.4e}", outlet.controller.mass_flow_rate())]);
            }
            table.printstd();
        }

        let settings = self.settings();
        println!("\nIntegrator:");
        let mut table = Table::new();
        table.add_row(row!["Parameter", "Value"]);
        table.add_row(row!["solver", format!("{:?}", settings.solver)]);
        table.add_row(row!["rtol", format!("{:.1e}", settings.rtol)]);
        table.add_row(row!["atol", format!("{:.1e}", settings.atol)]);
        table.add_row(row!["max_step", format!("{:?}", settings.max_step)]);
        table.add_row(row!["step_size", format!("{:.1e}", settings.step_size)]);
        table.add_row(row!["max_iterations", settings.max_iterations]);
        table.printstd();
        println!("\n=== END NETWORK SUMMARY ===\n");
    }

    /// Displays the system of differential equations, one row per unknown.
    pub fn pretty_print_equations(&self) {
        println!("____________________EQUATIONS_________________________");
        use prettytable::{Cell, Row, Table, row};

        let mut table = Table::new();
        table.add_row(row!["Unknown Var", "Equation"]);
        for (unknown, equation) in self.unknowns().iter().zip(self.equations()) {
            table.add_row(Row::new(vec![
                Cell::new(&format!("d{}/dt", unknown)),
                Cell::new(&format!("{}", equation)),
            ]));
        }
        table.printstd();
    }
}
