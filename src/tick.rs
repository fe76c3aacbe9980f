// The result of a widget update pass, telling the host what to do next
#[derive(Default, Debug)]
pub struct UpdateResult {
    /// The texture content changed, the host should redraw the quad
    pub needs_redraw: bool,
    /// The backing texture was reallocated during this pass
    pub resized: bool,
    /// How many paint notifications were applied (dropped ones not counted)
    pub paints_applied: usize,
}
