use crate::report::HopRecord;
use crate::supervisor::MtrReport;
use colored::Colorize;
use std::fs::File;
use std::io::Write;

impl MtrReport {
    pub fn to_json_file(&self, path: &str) -> Result<(), std::io::Error> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Writes the report text exactly as mtr printed it
    pub fn to_text_file(&self, path: &str) -> Result<(), std::io::Error> {
        let mut file = File::create(path)?;
        file.write_all(self.results.raw.as_bytes())?;
        Ok(())
    }

    pub fn print_table(&self) {
        if let Some(host) = &self.host {
            println!("{} {}", "Host:".bold(), host);
        }
        if let Some(datetime) = &self.datetime {
            println!("{} {}", "Start:".bold(), datetime);
        }

        let show_asn = self.results.hops.iter().any(|hop| hop.asn.is_some());
        let host_width = self
            .results
            .hops
            .iter()
            .map(|hop| hop.host.len())
            .max()
            .unwrap_or(4)
            .max(4);

        let header = format!(
            "{:>4}  {}{:<host_width$}  {:>6} {:>4} {:>4} {:>4} {:>7} {:>7} {:>7} {:>7} {:>6} {:>6} {:>6} {:>6}",
            "Hop",
            if show_asn { format!("{:<9}", "ASN") } else { String::new() },
            "Host",
            "Loss%",
            "Snt",
            "Drop",
            "Rcv",
            "Last",
            "Best",
            "Avg",
            "Wrst",
            "Jttr",
            "Javg",
            "Jmax",
            "Jint",
        );
        println!("{}", header.bold());

        for hop in &self.results.hops {
            let asn = if show_asn {
                format!("{:<9}", hop.asn.as_deref().unwrap_or("-"))
            } else {
                String::new()
            };
            let loss = format!("{:>6}", format!("{}%", hop.loss));
            println!(
                "{:>4}  {}{:<host_width$}  {} {:>4} {:>4} {:>4} {:>7} {:>7} {:>7} {:>7} {:>6} {:>6} {:>6} {:>6}",
                hop.hop,
                asn,
                hop.host,
                colour_loss(hop, loss),
                hop.snt,
                hop.drop,
                hop.rcv,
                hop.last,
                hop.best,
                hop.avg,
                hop.wrst,
                hop.jttr,
                hop.javg,
                hop.jmax,
                hop.jint,
            );
        }

        println!(
            "\n{} hops in {:.2}s",
            self.results.hops.len(),
            self.timetaken.as_secs_f64()
        );
    }
}

fn colour_loss(hop: &HopRecord, text: String) -> colored::ColoredString {
    match hop.loss_pct() {
        Some(loss) if loss >= 50.0 => text.red().bold(),
        Some(loss) if loss > 0.0 => text.yellow(),
        Some(_) => text.green(),
        None => text.normal(),
    }
}
