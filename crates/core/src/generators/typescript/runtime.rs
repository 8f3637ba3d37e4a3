//! Hand-written runtime code shipped inside `index.ts`.
//!
//! These blocks don't fit the statement AST and are emitted as raw code. They
//! reference `AllTypesProps`, `ReturnTypes` and `Ops` from `const.ts` and the
//! generated `ValueTypes`/`GraphQLTypes` maps.

use crate::options::{Environment, SubscriptionTransport};

/// Binds `fetchImpl` and `WebSocketImpl` for the target environment.
pub fn environment_bindings(environment: Environment) -> &'static str {
    match environment {
        Environment::Node => NODE_BINDINGS,
        Environment::Browser => BROWSER_BINDINGS,
    }
}

/// `apiSubscription` for the selected transport.
pub fn subscription_runtime(transport: SubscriptionTransport) -> &'static str {
    match transport {
        SubscriptionTransport::GraphqlWs => GRAPHQL_WS_SUBSCRIPTION,
        SubscriptionTransport::Legacy => LEGACY_SUBSCRIPTION,
    }
}

const NODE_BINDINGS: &str = r#"
const fetchImpl = fetch;
const WebSocketImpl = WebSocket;
"#;

const BROWSER_BINDINGS: &str = r#"
const fetchImpl = globalThis.fetch.bind(globalThis);
const WebSocketImpl = globalThis.WebSocket;
"#;

pub const FETCH_RUNTIME: &str = r#"
export type GraphQLResponse = {
  data?: Record<string, any>;
  errors?: Array<{ message: string }>;
};

export class GraphQLError extends Error {
  constructor(public response: GraphQLResponse) {
    super('');
    console.error(response);
  }
  toString() {
    return 'GraphQL Response Error';
  }
}

export type chainOptions =
  | [string, { headers?: Record<string, string>; method?: 'GET' | 'POST' }]
  | [string];

export type FetchFunction = (query: string, variables?: Record<string, unknown>) => Promise<any>;

const handleFetchResponse = (response: Response): Promise<GraphQLResponse> => {
  if (!response.ok) {
    return new Promise((_, reject) => {
      response
        .text()
        .then((text) => {
          try {
            reject(JSON.parse(text));
          } catch {
            reject(text);
          }
        })
        .catch(reject);
    });
  }
  return response.json() as Promise<GraphQLResponse>;
};

export const apiFetch =
  (options: chainOptions): FetchFunction =>
  (query: string, variables: Record<string, unknown> = {}) => {
    const [url, init = {}] = options;
    const headers = { ...HEADERS, ...init.headers };
    const request =
      init.method === 'GET'
        ? fetchImpl(`${url}?query=${encodeURIComponent(query)}`, { ...init, headers })
        : fetchImpl(url, {
            ...init,
            method: 'POST',
            headers: { 'Content-Type': 'application/json', ...headers },
            body: JSON.stringify({ query, variables }),
          });
    return request.then(handleFetchResponse).then((response) => {
      if (response.errors) {
        throw new GraphQLError(response);
      }
      return response.data;
    });
  };

export type SubscriptionHandle = {
  ws: unknown;
  unsubscribe?: () => void;
  on: (fn: (data: any) => void) => void;
  off: (fn: (event: unknown) => void) => void;
  error: (fn: (event: unknown) => void) => void;
  open: (fn: () => void) => void;
};

export type SubscriptionFunction = (query: string) => SubscriptionHandle;
"#;

const LEGACY_SUBSCRIPTION: &str = r#"
export const apiSubscription =
  (options: chainOptions): SubscriptionFunction =>
  (query: string) => {
    const url = options[0].replace(/^http/, 'ws');
    const ws: any = new WebSocketImpl(url, 'graphql-ws');
    ws.addEventListener('open', () => {
      ws.send(
        JSON.stringify({
          type: 'connection_init',
          payload: { headers: { ...HEADERS, ...options[1]?.headers } },
        }),
      );
      ws.send(JSON.stringify({ id: '1', type: 'start', payload: { query } }));
    });
    return {
      ws,
      unsubscribe: () => ws.send(JSON.stringify({ id: '1', type: 'stop' })),
      on: (fn) => {
        ws.addEventListener('message', (event: { data: unknown }) => {
          if (typeof event.data !== 'string') return;
          const message = JSON.parse(event.data);
          if (message.type === 'data' && message.payload?.data) {
            fn(message.payload.data);
          }
        });
      },
      off: (fn) => ws.addEventListener('close', fn),
      error: (fn) => ws.addEventListener('error', fn),
      open: (fn) => ws.addEventListener('open', fn),
    };
  };
"#;

const GRAPHQL_WS_SUBSCRIPTION: &str = r#"
export const apiSubscription = (options: chainOptions): SubscriptionFunction => {
  const client = createClient({
    url: String(options[0]).replace(/^http/, 'ws'),
    webSocketImpl: WebSocketImpl,
    connectionParams: { headers: { ...HEADERS, ...options[1]?.headers } },
  });
  return (query: string) => {
    let onNext: ((data: any) => void) | undefined;
    let onError: ((event: unknown) => void) | undefined;
    let onClose: ((event: unknown) => void) | undefined;
    const unsubscribe = client.subscribe(
      { query },
      {
        next: ({ data }) => onNext?.(data),
        error: (event) => onError?.(event),
        complete: () => onClose?.(undefined),
      },
    );
    return {
      ws: client,
      unsubscribe,
      on: (fn) => {
        onNext = fn;
      },
      off: (fn) => {
        onClose = fn;
      },
      error: (fn) => {
        onError = fn;
      },
      open: (fn) => {
        client.on('connected', fn);
      },
    };
  };
};
"#;

pub const OPERATION_RUNTIME: &str = r#"
type RenderContext = {
  variables: Map<string, string>;
  scalars?: ScalarDefinition;
};

export const $ = <Type extends string, Name extends string>(name: Name, graphqlType: Type) =>
  `$${name}::${graphqlType}` as unknown as Variable<Type, Name>;

const renderValue = (value: unknown, typeName: string | undefined, ctx: RenderContext): string => {
  if (value === null || value === undefined) return 'null';
  if (typeof value === 'string' && value.startsWith('$') && value.includes('::')) {
    const [name, graphqlType] = value.slice(1).split('::');
    ctx.variables.set(name, graphqlType);
    return `$${name}`;
  }
  const encode = typeName ? ctx.scalars?.[typeName]?.encode : undefined;
  if (encode) return encode(value);
  if (Array.isArray(value)) {
    return `[${value.map((item) => renderValue(item, typeName, ctx)).join(', ')}]`;
  }
  if (typeof value === 'string') {
    return typeName && AllTypesProps[typeName] === 'enum' ? value : JSON.stringify(value);
  }
  if (typeof value === 'object') {
    const fieldTypes = typeName ? AllTypesProps[typeName] : undefined;
    const fields = Object.entries(value as Record<string, unknown>)
      .filter(([, v]) => v !== undefined)
      .map(([k, v]) => `${k}: ${renderValue(v, typeof fieldTypes === 'object' ? fieldTypes[k] : undefined, ctx)}`);
    return `{${fields.join(', ')}}`;
  }
  return String(value);
};

const renderArguments = (
  args: Record<string, unknown>,
  parentType: string | undefined,
  field: string,
  ctx: RenderContext,
): string => {
  const argTypes = parentType ? AllTypesProps[parentType]?.[field] ?? {} : {};
  const rendered = Object.entries(args)
    .filter(([, value]) => value !== undefined)
    .map(([name, value]) => `${name}: ${renderValue(value, argTypes[name], ctx)}`);
  return rendered.length ? `(${rendered.join(', ')})` : '';
};

const renderSelection = (selection: unknown, typeName: string | undefined, ctx: RenderContext): string => {
  if (typeof selection !== 'object' || selection === null) return '';
  const fields = Object.entries(selection as Record<string, unknown>)
    .filter(([, value]) => value !== undefined && value !== false)
    .map(([key, value]) => {
      if (key.startsWith('...on ')) {
        return `${key} ${renderSelection(value, key.slice('...on '.length), ctx)}`;
      }
      const childType = typeName ? ReturnTypes[typeName]?.[key] : undefined;
      if (Array.isArray(value)) {
        const [args, nested] = value;
        const sub = typeof nested === 'object' ? ` ${renderSelection(nested, childType, ctx)}` : '';
        return `${key}${renderArguments(args ?? {}, typeName, key, ctx)}${sub}`;
      }
      if (typeof value === 'object') return `${key} ${renderSelection(value, childType, ctx)}`;
      return key;
    });
  return `{ ${fields.join(' ')} }`;
};

const decodeScalars = (data: unknown, typeName: string | undefined, scalars?: ScalarDefinition): unknown => {
  if (!scalars || !typeName || data === null || data === undefined) return data;
  if (Array.isArray(data)) return data.map((item) => decodeScalars(item, typeName, scalars));
  const decode = scalars[typeName]?.decode;
  if (decode) return decode(data);
  if (typeof data !== 'object') return data;
  return Object.fromEntries(
    Object.entries(data as Record<string, unknown>).map(([key, value]) => [
      key,
      decodeScalars(value, ReturnTypes[typeName]?.[key], scalars),
    ]),
  );
};

export const Zeus = <
  Z extends ValueTypes[R],
  O extends keyof typeof Ops,
  R extends keyof ValueTypes = GenericOperation<O>,
>(
  operation: O,
  o: Z,
  ops?: { operationOptions?: OperationOptions; scalars?: ScalarDefinition },
) => {
  const ctx: RenderContext = { variables: new Map(), scalars: ops?.scalars };
  const body = renderSelection(o, Ops[operation], ctx);
  const definitions = [...ctx.variables].map(([name, graphqlType]) => `$${name}: ${graphqlType}`);
  const variables = definitions.length ? `(${definitions.join(', ')})` : '';
  const name = ops?.operationOptions?.operationName;
  return `${String(operation)}${name ? ` ${name}` : ''}${variables} ${body}`;
};

export const Thunder =
  (fn: FetchFunction, thunderGraphQLOptions?: ThunderGraphQLOptions<ScalarDefinition>) =>
  <O extends keyof typeof Ops, SCLR extends ScalarDefinition, R extends keyof ValueTypes = GenericOperation<O>>(
    operation: O,
    graphqlOptions?: ThunderGraphQLOptions<SCLR>,
  ) =>
  <Z extends ValueTypes[R]>(o: Z, ops?: OperationOptions & { variables?: ExtractVariables<Z> }) => {
    const scalars = graphqlOptions?.scalars ?? thunderGraphQLOptions?.scalars;
    return fn(Zeus(operation, o, { operationOptions: ops, scalars }), ops?.variables).then((data) =>
      decodeScalars(data, Ops[operation], scalars),
    ) as Promise<InputType<GraphQLTypes[R], Z, SCLR>>;
  };

export const Chain = (...options: chainOptions) => Thunder(apiFetch(options));

export const SubscriptionThunder =
  (fn: SubscriptionFunction, thunderGraphQLOptions?: ThunderGraphQLOptions<ScalarDefinition>) =>
  <O extends keyof typeof Ops, SCLR extends ScalarDefinition, R extends keyof ValueTypes = GenericOperation<O>>(
    operation: O,
    graphqlOptions?: ThunderGraphQLOptions<SCLR>,
  ) =>
  <Z extends ValueTypes[R]>(o: Z, ops?: OperationOptions) => {
    const scalars = graphqlOptions?.scalars ?? thunderGraphQLOptions?.scalars;
    const handle = fn(Zeus(operation, o, { operationOptions: ops, scalars }));
    return {
      ...handle,
      on: (listener: (data: InputType<GraphQLTypes[R], Z, SCLR>) => void) =>
        handle.on((data) =>
          listener(decodeScalars(data, Ops[operation], scalars) as InputType<GraphQLTypes[R], Z, SCLR>),
        ),
    };
  };

export const Subscription = (...options: chainOptions) => SubscriptionThunder(apiSubscription(options));
"#;

pub const HELPER_TYPES: &str = r#"
export type AliasType<T> = T & { __typename?: boolean | `@${string}` };

export type ScalarResolver = {
  encode?: (value: unknown) => string;
  decode?: (value: unknown) => unknown;
};

export type ScalarDefinition = Record<string, ScalarResolver>;

export type OperationOptions = {
  operationName?: string;
};

export type ThunderGraphQLOptions<SCLR extends ScalarDefinition> = {
  scalars?: SCLR | ScalarDefinition;
};

export type GenericOperation<O> = O extends keyof typeof Ops ? (typeof Ops)[O] : never;

export type Variable<T extends string, Name extends string> = {
  ' __zeus_name': Name;
  ' __zeus_type': T;
};

type UnionToIntersection<U> = (U extends any ? (k: U) => void : never) extends (k: infer I) => void
  ? I
  : never;

export type ExtractVariables<Query> = Query extends Variable<string, infer VName>
  ? { [key in VName]: unknown }
  : Query extends [infer Inputs, infer Outputs]
    ? ExtractVariables<Inputs> & ExtractVariables<Outputs>
    : Query extends string | number | boolean
      ? {}
      : UnionToIntersection<{ [K in keyof Query]: ExtractVariables<Query[K]> }[keyof Query]>;

// Custom scalars in GraphQLTypes; InputType swaps them for the decoded type.
export type ScalarTag<Name extends string> = { readonly ' __zeus_scalar': Name };

export type DecodedScalar<Name, SCLR extends ScalarDefinition> = Name extends keyof SCLR
  ? NonNullable<NonNullable<SCLR[Name]>['decode']> extends (value: unknown) => infer D
    ? D
    : unknown
  : unknown;

export type InputType<SRC, IT, SCLR extends ScalarDefinition = {}> = SRC extends Array<infer R>
  ? Array<InputType<R, IT, SCLR>>
  : SRC extends null | undefined
    ? SRC
    : SRC extends ScalarTag<infer Name>
      ? DecodedScalar<Name, SCLR>
      : IT extends [unknown, infer Selection]
        ? InputType<SRC, Selection, SCLR>
        : IT extends Record<string, unknown>
          ? { [P in keyof IT & keyof SRC]: InputType<SRC[P], IT[P], SCLR> }
          : SRC;
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_bindings_avoid_globals() {
        assert!(!environment_bindings(Environment::Node).contains("globalThis"));
        assert!(environment_bindings(Environment::Browser).contains("globalThis.fetch"));
    }

    #[test]
    fn test_shared_runtime_has_no_environment_globals() {
        for block in [FETCH_RUNTIME, OPERATION_RUNTIME, HELPER_TYPES] {
            assert!(!block.contains("globalThis"));
        }
    }

    #[test]
    fn test_subscription_transports() {
        assert!(subscription_runtime(SubscriptionTransport::GraphqlWs).contains("createClient("));
        let legacy = subscription_runtime(SubscriptionTransport::Legacy);
        assert!(legacy.contains("type: 'start'"));
        assert!(!legacy.contains("createClient"));
    }
}
