mod check;
mod pipeline;
mod run;

pub use check::check;
pub use run::run;
