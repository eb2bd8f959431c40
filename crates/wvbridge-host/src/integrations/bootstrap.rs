/// Produces the script injected into the web context before content loads.
///
/// The bridge only supplies the sorted native method names; the script format
/// (dispatcher object, console hook) belongs to the implementor.
pub trait BootstrapScript {
    fn render(&self, bridge_names: &[String]) -> String;
}

impl<F> BootstrapScript for F
where
    F: Fn(&[String]) -> String,
{
    fn render(&self, bridge_names: &[String]) -> String {
        self(bridge_names)
    }
}
