#[cfg(test)]
pub mod common;

#[cfg(test)]
mod test_undo;






#[cfg(test)]
mod test_status_effects;

#[cfg(test)]
mod test_swap;
