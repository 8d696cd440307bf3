pub mod compile_time {
    pub mod pattern {
        /// Maximum length of the expression between pattern delimiters
        /// SECURITY: Bounds regex compilation cost for user-supplied patterns
        pub const MAX_PATTERN_LENGTH: usize = 1024;

        /// Compiled program size limit handed to the regex builder
        pub const MAX_COMPILED_PATTERN_SIZE: usize = 1024 * 1024;
    }

    pub mod matrix {
        /// Maximum number of entries in one test matrix specification
        pub const MAX_MATRIX_ENTRIES: usize = 10_000;

        /// Maximum class or node references in a single entry
        pub const MAX_REFERENCES_PER_ENTRY: usize = 1_000;
    }

    pub mod filter {
        /// Maximum nesting depth followed by the attribute filter
        /// SECURITY: Prevents unbounded recursion on hostile filter documents
        pub const MAX_FILTER_DEPTH: usize = 32;
    }

    pub mod facts {
        /// Fact key that belongs to the execution environment, never the simulated host
        pub const ENVIRONMENT_FACT: &str = "environment";
    }
}
