use analyzerlib::query::{NodeId, QueryGraph};
use analyzerlib::{FileQuery, ProcessQuery, StrFilter};
use proptest::prelude::*;

const POOL: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    /// Link process `j` under a process-to-process slot of process `i`.
    ProcProc { rel: u8, i: usize, j: usize },
    /// Link file `j` under a process-to-file slot of process `i`.
    ProcFile { rel: u8, i: usize, j: usize },
    /// Link process `j` under a file-to-process slot of file `i`.
    FileProc { rel: u8, i: usize, j: usize },
    NameProcess { i: usize, name: String },
    NameFile { i: usize, name: String },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..2, 0..POOL, 0..POOL).prop_map(|(rel, i, j)| Op::ProcProc { rel, i, j }),
        (0u8..5, 0..POOL, 0..POOL).prop_map(|(rel, i, j)| Op::ProcFile { rel, i, j }),
        (0u8..5, 0..POOL, 0..POOL).prop_map(|(rel, i, j)| Op::FileProc { rel, i, j }),
        (0..POOL, "[a-z]{1,8}").prop_map(|(i, name)| Op::NameProcess { i, name }),
        (0..POOL, "[a-z]{1,8}").prop_map(|(i, name)| Op::NameFile { i, name }),
    ]
}

struct Pool {
    procs: Vec<ProcessQuery>,
    files: Vec<FileQuery>,
}

impl Pool {
    fn new() -> Self {
        Self {
            procs: vec![ProcessQuery::new(); POOL],
            files: vec![FileQuery::new(); POOL],
        }
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::ProcProc { rel, i, j } => {
                let other = &self.procs[*j];
                let q = self.procs[*i].clone();
                self.procs[*i] = match rel {
                    0 => q.with_parent(other),
                    _ => q.with_children(other),
                };
            }
            Op::ProcFile { rel, i, j } => {
                let other = &self.files[*j];
                let q = self.procs[*i].clone();
                self.procs[*i] = match rel {
                    0 => q.with_bin_file(other),
                    1 => q.with_deleted_files(other),
                    2 => q.with_created_files(other),
                    3 => q.with_written_files(other),
                    _ => q.with_read_files(other),
                };
            }
            Op::FileProc { rel, i, j } => {
                let other = &self.procs[*j];
                let q = self.files[*i].clone();
                self.files[*i] = match rel {
                    0 => q.with_creator(other),
                    1 => q.with_deleter(other),
                    2 => q.with_writers(other),
                    3 => q.with_readers(other),
                    _ => q.with_spawned_from(other),
                };
            }
            Op::NameProcess { i, name } => {
                let q = self.procs[*i].clone();
                self.procs[*i] = q.with_process_name(StrFilter::new().contains(name.as_str()));
            }
            Op::NameFile { i, name } => {
                let q = self.files[*i].clone();
                self.files[*i] = q.with_file_name(StrFilter::new().eq(name.as_str()));
            }
        }
    }
}

fn assert_mutual(graph: &QueryGraph, root: NodeId) {
    for id in graph.reachable(root) {
        for (rel, target) in graph.edges(id) {
            assert_eq!(
                graph.neighbor(target, rel.inverse()),
                Some(id),
                "{rel} from {id:?} has no inverse"
            );
        }
    }
}

proptest! {
    #[test]
    fn prop_compilation_binds_root_once(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut pool = Pool::new();
        for op in &ops {
            pool.apply(op);
        }

        let query = &pool.procs[0];
        let block = &query.get_queries(None).blocks[0];
        let reachable = query.graph().reachable(query.root()).len();

        prop_assert_eq!(block.matches("Binding0").count(), 1);
        prop_assert!(block.starts_with("Binding0 as var("));
        prop_assert_eq!(block.matches("{ uid").count(), reachable);
        prop_assert_eq!(block.matches('{').count(), block.matches('}').count());

        let file = &pool.files[0];
        let block = &file.get_queries(None).blocks[0];
        prop_assert_eq!(block.matches("Binding0").count(), 1);
        prop_assert!(
            block.matches("{ uid").count() <= file.graph().node_count(),
            "more uid blocks than nodes in file graph"
        );
    }

    #[test]
    fn prop_links_are_mutual(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut pool = Pool::new();
        for op in &ops {
            pool.apply(op);
        }
        for q in &pool.procs {
            assert_mutual(q.graph(), q.root());
        }
        for q in &pool.files {
            assert_mutual(q.graph(), q.root());
        }
    }

    #[test]
    fn prop_linking_leaves_argument_untouched(
        ops in prop::collection::vec(arb_op(), 0..30),
        rel in 0u8..2,
    ) {
        let mut pool = Pool::new();
        for op in &ops {
            pool.apply(op);
        }

        let argument = pool.procs[1].clone();
        let before_nodes = argument.graph().node_count();
        let before_text = argument.to_query(false, None);

        let _linked = match rel {
            0 => pool.procs[0].clone().with_children(&argument),
            _ => pool.procs[0].clone().with_parent(&argument),
        };

        prop_assert_eq!(argument.graph().node_count(), before_nodes);
        prop_assert_eq!(argument.to_query(false, None), before_text);
    }
}
