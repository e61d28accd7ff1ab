mod tests_declared_sharing;
mod tests_end_to_end;
mod tests_extensions;
mod tests_statements;
