mod tests_source_loader;
