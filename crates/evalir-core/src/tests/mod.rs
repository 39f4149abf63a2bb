/*! Test coverage for the module builder.
 *
 * These exercise the builder the way lowering drives it: declare externals, define storage
 * cells, open the entry function and append loads and calls at the cursor.
 */

mod call_tests;
