#[cfg(test)]
pub mod test_dir;
