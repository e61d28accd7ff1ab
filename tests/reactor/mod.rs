mod tests_inference;
mod tests_linkage;
mod tests_phase_ordering;
