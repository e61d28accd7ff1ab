mod tests_memoization;
mod tests_source_cache;
